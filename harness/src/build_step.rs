use std::{
    path::{Path, PathBuf},
    process::Command,
};

/// Rebuilds the native bench with `make -C <dir>`.
///
/// The result is only logged: a build that leaves no executable behind is
/// caught when the bench is launched.
#[derive(Debug, Clone)]
pub struct MakeBuild {
    dir: PathBuf,
}

impl MakeBuild {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn command(&self) -> Command {
        let mut command = Command::new("make");
        command.arg("-C").arg(&self.dir);
        command
    }

    pub fn run(&self) {
        log::info!("building native bench: make -C {}", self.dir.display());
        match self.command().status() {
            Ok(status) if status.success() => {},
            Ok(status) => log::warn!("make -C {} exited with {status}", self.dir.display()),
            Err(error) => log::warn!("failed to run make: {error}"),
        }
    }
}
