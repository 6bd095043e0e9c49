use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{
    error::{HarnessError, Result},
    report::MetricReport,
};

/// Single-snapshot baseline file. Saving replaces the previous snapshot.
#[derive(Debug, Clone)]
pub struct BaselineStore {
    path: PathBuf,
}

impl BaselineStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> Result<MetricReport> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                return Err(HarnessError::BaselineMissing(self.path.clone()));
            },
            Err(error) => return Err(self.corrupt(error)),
        };
        MetricReport::from_json_str(&data).map_err(|error| self.corrupt(error))
    }

    pub fn save(
        &self,
        report: &MetricReport,
    ) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut data = report.to_json_pretty().map_err(std::io::Error::other)?;
        data.push('\n');
        fs::write(&self.path, data)?;
        log::info!("baseline written to {}", self.path.display());
        Ok(())
    }

    fn corrupt(
        &self,
        reason: impl ToString,
    ) -> HarnessError {
        HarnessError::BaselineCorrupt {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}
