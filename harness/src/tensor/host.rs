use std::cell::RefCell;

use half::f16;
use rand::{Rng, SeedableRng, rngs::StdRng};

use super::TensorBackend;
use crate::error::{HarnessError, Result};

const HOST_BACKEND_NAME: &str = "host";

/// Dense row-major f16 tensor living in host memory.
#[derive(Debug, Clone, PartialEq)]
pub struct HostTensor {
    shape: Vec<usize>,
    data: Vec<f16>,
}

impl HostTensor {
    pub fn from_f32(
        shape: &[usize],
        values: &[f32],
    ) -> Result<Self> {
        if shape.iter().product::<usize>() != values.len() {
            return Err(HarnessError::backend_failed(
                HOST_BACKEND_NAME,
                format!(
                    "shape {shape:?} does not match {} values",
                    values.len()
                ),
            ));
        }
        Ok(Self {
            shape: shape.to_vec(),
            data: values.iter().copied().map(f16::from_f32).collect(),
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn to_f32_vec(&self) -> Vec<f32> {
        self.data.iter().map(|v| v.to_f32()).collect()
    }

    fn map(
        &self,
        f: impl Fn(f32) -> f32,
    ) -> Self {
        Self {
            shape: self.shape.clone(),
            data: self.data.iter().map(|v| f16::from_f32(f(v.to_f32()))).collect(),
        }
    }

    fn last_axis(&self) -> Result<(usize, usize)> {
        let Some(&cols) = self.shape.last() else {
            return Err(HarnessError::backend_failed(
                HOST_BACKEND_NAME,
                "scalar tensor has no last axis",
            ));
        };
        let rows = if cols == 0 {
            0
        } else {
            self.data.len() / cols
        };
        Ok((rows, cols))
    }
}

/// Reference implementation of the tensor capability on the CPU.
///
/// Eager, so `eval` is a no-op. Accumulation happens in f32.
pub struct HostBackend {
    rng: RefCell<StdRng>,
}

impl HostBackend {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for HostBackend {
    fn default() -> Self {
        Self::new(0)
    }
}

fn broadcast_shape(
    a: &[usize],
    b: &[usize],
) -> Result<Vec<usize>> {
    let rank = a.len().max(b.len());
    let mut shape = vec![0; rank];
    for i in 0..rank {
        let da = dim_from_right(a, rank - 1 - i);
        let db = dim_from_right(b, rank - 1 - i);
        shape[i] = match (da, db) {
            (x, y) if x == y => x,
            (1, y) => y,
            (x, 1) => x,
            _ => {
                return Err(HarnessError::backend_failed(
                    HOST_BACKEND_NAME,
                    format!("cannot broadcast {a:?} with {b:?}"),
                ));
            },
        };
    }
    Ok(shape)
}

fn dim_from_right(
    shape: &[usize],
    from_right: usize,
) -> usize {
    if from_right < shape.len() {
        shape[shape.len() - 1 - from_right]
    } else {
        1
    }
}

/// Flat offset into a tensor of `shape` for an index into the broadcast
/// output of `out_shape`.
fn broadcast_offset(
    index: &[usize],
    out_shape: &[usize],
    shape: &[usize],
) -> usize {
    let skip = out_shape.len() - shape.len();
    let mut offset = 0;
    for (axis, &dim) in shape.iter().enumerate() {
        let i = if dim == 1 {
            0
        } else {
            index[axis + skip]
        };
        offset = offset * dim + i;
    }
    offset
}

impl TensorBackend for HostBackend {
    type Tensor = HostTensor;

    fn name(&self) -> &str {
        HOST_BACKEND_NAME
    }

    fn uniform(
        &self,
        shape: &[usize],
    ) -> Result<HostTensor> {
        let len = shape.iter().product();
        let mut rng = self.rng.borrow_mut();
        let data = (0..len)
            .map(|_| f16::from_f32(rng.random_range(0.0f32..1.0f32)))
            .collect();
        Ok(HostTensor {
            shape: shape.to_vec(),
            data,
        })
    }

    fn ones(
        &self,
        shape: &[usize],
    ) -> Result<HostTensor> {
        Ok(HostTensor {
            shape: shape.to_vec(),
            data: vec![f16::ONE; shape.iter().product()],
        })
    }

    fn eval(
        &self,
        _tensors: &[&HostTensor],
    ) -> Result<()> {
        Ok(())
    }

    fn matmul(
        &self,
        a: &HostTensor,
        b: &HostTensor,
    ) -> Result<HostTensor> {
        let (&[m, k], &[kb, n]) = (a.shape.as_slice(), b.shape.as_slice())
        else {
            return Err(HarnessError::backend_failed(
                HOST_BACKEND_NAME,
                "matmul expects two rank-2 tensors",
            ));
        };
        if k != kb {
            return Err(HarnessError::backend_failed(
                HOST_BACKEND_NAME,
                format!("matmul inner dimensions differ: {k} vs {kb}"),
            ));
        }
        let lhs = a.to_f32_vec();
        let rhs = b.to_f32_vec();
        let mut acc = vec![0.0f32; m * n];
        for i in 0..m {
            let row = &mut acc[i * n..(i + 1) * n];
            for p in 0..k {
                let scale = lhs[i * k + p];
                for (out, &value) in row.iter_mut().zip(&rhs[p * n..(p + 1) * n]) {
                    *out += scale * value;
                }
            }
        }
        Ok(HostTensor {
            shape: vec![m, n],
            data: acc.into_iter().map(f16::from_f32).collect(),
        })
    }

    fn softmax_last_axis(
        &self,
        x: &HostTensor,
    ) -> Result<HostTensor> {
        let (_, cols) = x.last_axis()?;
        let values = x.to_f32_vec();
        let mut data = Vec::with_capacity(values.len());
        for row in values.chunks(cols.max(1)) {
            let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let exps: Vec<f32> = row.iter().map(|v| (v - max).exp()).collect();
            let sum: f32 = exps.iter().sum();
            data.extend(exps.iter().map(|e| f16::from_f32(e / sum)));
        }
        Ok(HostTensor {
            shape: x.shape.clone(),
            data,
        })
    }

    fn multiply(
        &self,
        a: &HostTensor,
        b: &HostTensor,
    ) -> Result<HostTensor> {
        let shape = broadcast_shape(&a.shape, &b.shape)?;
        let len: usize = shape.iter().product();
        let mut index = vec![0usize; shape.len()];
        let mut data = Vec::with_capacity(len);
        for _ in 0..len {
            let lhs = a.data[broadcast_offset(&index, &shape, &a.shape)];
            let rhs = b.data[broadcast_offset(&index, &shape, &b.shape)];
            data.push(f16::from_f32(lhs.to_f32() * rhs.to_f32()));
            for axis in (0..shape.len()).rev() {
                index[axis] += 1;
                if index[axis] < shape[axis] {
                    break;
                }
                index[axis] = 0;
            }
        }
        Ok(HostTensor {
            shape,
            data,
        })
    }

    fn mean_last_axis_keepdims(
        &self,
        x: &HostTensor,
    ) -> Result<HostTensor> {
        let (_, cols) = x.last_axis()?;
        let values = x.to_f32_vec();
        let data = values
            .chunks(cols.max(1))
            .map(|row| f16::from_f32(row.iter().sum::<f32>() / cols as f32))
            .collect();
        let mut shape = x.shape.clone();
        if let Some(last) = shape.last_mut() {
            *last = 1;
        }
        Ok(HostTensor {
            shape,
            data,
        })
    }

    fn add_scalar(
        &self,
        x: &HostTensor,
        value: f32,
    ) -> Result<HostTensor> {
        Ok(x.map(|v| v + value))
    }

    fn rsqrt(
        &self,
        x: &HostTensor,
    ) -> Result<HostTensor> {
        Ok(x.map(|v| 1.0 / v.sqrt()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tensor(
        shape: &[usize],
        values: &[f32],
    ) -> HostTensor {
        HostTensor::from_f32(shape, values).unwrap()
    }

    #[test]
    fn matmul_small() {
        let backend = HostBackend::default();
        let a = tensor(&[2, 3], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = tensor(&[3, 2], &[1.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        let c = backend.matmul(&a, &b).unwrap();
        assert_eq!(c.shape(), &[2, 2]);
        assert_eq!(c.to_f32_vec(), vec![4.0, 5.0, 10.0, 11.0]);
    }

    #[test]
    fn matmul_rejects_mismatched_inner_dimension() {
        let backend = HostBackend::default();
        let a = backend.ones(&[2, 3]).unwrap();
        let b = backend.ones(&[2, 2]).unwrap();
        assert!(backend.matmul(&a, &b).is_err());
    }

    #[test]
    fn softmax_rows_sum_to_one() {
        let backend = HostBackend::default();
        let x = tensor(&[2, 2], &[0.0, 0.0, 1.0, 3.0]);
        let y = backend.softmax_last_axis(&x).unwrap().to_f32_vec();
        assert!(is_close!(y[0], 0.5));
        assert!(is_close!(y[1], 0.5));
        assert!((y[2] + y[3] - 1.0).abs() < 1e-3);
        assert!(y[3] > y[2]);
    }

    #[test]
    fn rms_norm_pipeline_broadcasts() {
        let backend = HostBackend::default();
        let x = tensor(&[2, 2], &[3.0, 4.0, 1.0, 1.0]);
        let squared = backend.multiply(&x, &x).unwrap();
        let mean = backend.mean_last_axis_keepdims(&squared).unwrap();
        assert_eq!(mean.shape(), &[2, 1]);
        assert_eq!(mean.to_f32_vec(), vec![12.5, 1.0]);

        let inv = backend.rsqrt(&backend.add_scalar(&mean, 0.0).unwrap()).unwrap();
        let gamma = tensor(&[2], &[1.0, 2.0]);
        let y = backend
            .multiply(&backend.multiply(&x, &inv).unwrap(), &gamma)
            .unwrap();
        assert_eq!(y.shape(), &[2, 2]);
        let y = y.to_f32_vec();
        assert!((y[2] - 1.0).abs() < 1e-3);
        assert!((y[3] - 2.0).abs() < 1e-3);
    }

    #[test]
    fn incompatible_broadcast_fails() {
        let backend = HostBackend::default();
        let a = backend.ones(&[2, 3]).unwrap();
        let b = backend.ones(&[2]).unwrap();
        assert!(backend.multiply(&a, &b).is_err());
    }

    #[test]
    fn uniform_is_seeded_and_in_range() {
        let first = HostBackend::new(7).uniform(&[4, 4]).unwrap();
        let second = HostBackend::new(7).uniform(&[4, 4]).unwrap();
        assert_eq!(first, second);
        assert!(first.to_f32_vec().iter().all(|v| (0.0..=1.0).contains(v)));
    }
}
