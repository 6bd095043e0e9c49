use mlx_rs::{Array, Device, Dtype, error::Exception, ops, random, transforms};

use super::TensorBackend;
use crate::{
    error::{HarnessError, Result},
    runner::MLX_BACKEND_NAME,
};

fn mlx_err(error: Exception) -> HarnessError {
    HarnessError::backend_failed(MLX_BACKEND_NAME, error)
}

fn dims(shape: &[usize]) -> Result<Vec<i32>> {
    shape
        .iter()
        .map(|&d| {
            i32::try_from(d).map_err(|_| {
                HarnessError::InvalidConfig(format!(
                    "dimension {d} exceeds MLX limits"
                ))
            })
        })
        .collect()
}

/// MLX arrays on the Metal GPU (or the MLX CPU stream when selected).
pub struct MlxBackend {
    device_label: String,
}

impl MlxBackend {
    /// Selects the device and forces one tiny evaluation so a broken
    /// runtime surfaces here rather than in the middle of a timed loop.
    pub fn probe(selector: Option<&str>) -> Result<Self> {
        let (device, device_label) = match selector {
            Some("cpu") => (Device::cpu(), "cpu"),
            Some("gpu") | None => (Device::gpu(), "gpu"),
            Some(other) => {
                log::debug!(
                    "selector {other:?} has no MLX meaning, using the default GPU"
                );
                (Device::gpu(), "gpu")
            },
        };
        Device::set_default(&device);

        let unavailable = |error: Exception| HarnessError::BackendUnavailable {
            backend: MLX_BACKEND_NAME.to_string(),
            reason: error.to_string(),
        };
        let probe = Array::from_f32(1.0)
            .as_dtype(Dtype::Float16)
            .map_err(unavailable)?;
        probe.eval().map_err(unavailable)?;

        Ok(Self {
            device_label: device_label.to_string(),
        })
    }

    pub fn device_label(&self) -> &str {
        &self.device_label
    }
}

impl TensorBackend for MlxBackend {
    type Tensor = Array;

    fn name(&self) -> &str {
        MLX_BACKEND_NAME
    }

    fn uniform(
        &self,
        shape: &[usize],
    ) -> Result<Array> {
        let shape = dims(shape)?;
        random::uniform::<_, f32>(0.0, 1.0, &shape, None)
            .and_then(|a| a.as_dtype(Dtype::Float16))
            .map_err(mlx_err)
    }

    fn ones(
        &self,
        shape: &[usize],
    ) -> Result<Array> {
        let shape = dims(shape)?;
        Array::ones::<f32>(&shape)
            .and_then(|a| a.as_dtype(Dtype::Float16))
            .map_err(mlx_err)
    }

    fn eval(
        &self,
        tensors: &[&Array],
    ) -> Result<()> {
        transforms::eval(tensors.iter().copied()).map_err(mlx_err)
    }

    fn matmul(
        &self,
        a: &Array,
        b: &Array,
    ) -> Result<Array> {
        ops::matmul(a, b).map_err(mlx_err)
    }

    fn softmax_last_axis(
        &self,
        x: &Array,
    ) -> Result<Array> {
        ops::softmax_axis(x, -1, None).map_err(mlx_err)
    }

    fn multiply(
        &self,
        a: &Array,
        b: &Array,
    ) -> Result<Array> {
        ops::multiply(a, b).map_err(mlx_err)
    }

    fn mean_last_axis_keepdims(
        &self,
        x: &Array,
    ) -> Result<Array> {
        ops::mean_axis(x, -1, true).map_err(mlx_err)
    }

    fn add_scalar(
        &self,
        x: &Array,
        value: f32,
    ) -> Result<Array> {
        // A f32 scalar would promote the result out of half precision.
        let scalar =
            Array::from_f32(value).as_dtype(x.dtype()).map_err(mlx_err)?;
        ops::add(x, &scalar).map_err(mlx_err)
    }

    fn rsqrt(
        &self,
        x: &Array,
    ) -> Result<Array> {
        ops::rsqrt(x).map_err(mlx_err)
    }
}
