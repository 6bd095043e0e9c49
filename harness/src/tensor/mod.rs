//! Minimal tensor capability the GPU baseline has to provide.
//!
//! Every tensor is half precision. Operations may be lazy; `eval` is the
//! synchronization point that retires all outstanding work, so timings taken
//! around it cover the real device execution.

#[cfg(test)]
mod host;
#[cfg(all(feature = "mlx", target_os = "macos"))]
mod mlx;

#[cfg(test)]
pub(crate) use host::{HostBackend, HostTensor};
#[cfg(all(feature = "mlx", target_os = "macos"))]
pub use mlx::MlxBackend;

use crate::error::Result;

pub trait TensorBackend {
    type Tensor;

    fn name(&self) -> &str;

    /// Uniform random values in `[0, 1)`.
    fn uniform(
        &self,
        shape: &[usize],
    ) -> Result<Self::Tensor>;

    fn ones(
        &self,
        shape: &[usize],
    ) -> Result<Self::Tensor>;

    fn eval(
        &self,
        tensors: &[&Self::Tensor],
    ) -> Result<()>;

    fn matmul(
        &self,
        a: &Self::Tensor,
        b: &Self::Tensor,
    ) -> Result<Self::Tensor>;

    fn softmax_last_axis(
        &self,
        x: &Self::Tensor,
    ) -> Result<Self::Tensor>;

    /// Elementwise product with right-aligned broadcasting.
    fn multiply(
        &self,
        a: &Self::Tensor,
        b: &Self::Tensor,
    ) -> Result<Self::Tensor>;

    fn mean_last_axis_keepdims(
        &self,
        x: &Self::Tensor,
    ) -> Result<Self::Tensor>;

    fn add_scalar(
        &self,
        x: &Self::Tensor,
        value: f32,
    ) -> Result<Self::Tensor>;

    fn rsqrt(
        &self,
        x: &Self::Tensor,
    ) -> Result<Self::Tensor>;
}
