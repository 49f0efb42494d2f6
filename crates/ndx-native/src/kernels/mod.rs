//! Bitwise kernels for the native backend
//!
//! One kernel type per operation variant. Each picks the element type from
//! the output dtype and runs the shared strided loop with its operator.

mod strided;

use crate::config::NativeConfig;
use anyhow::anyhow;
use ndx_core::{Array, Dtype, Error, Result, Scalar};
use ndx_kernel::{ArrayScalarKernel, BinaryKernel, Kernel, OpName};

fn unsupported(op: OpName, dtype: Dtype) -> Error {
    anyhow!("native {op} kernel has no implementation for {dtype}").into()
}

/// Run `$body` with `$T` bound to the element type of `$dtype`
macro_rules! with_bitwise_type {
    ($op:expr, $dtype:expr, $T:ident => $body:expr) => {
        match $dtype {
            Dtype::Bool => {
                type $T = bool;
                $body
            }
            Dtype::Int8 => {
                type $T = i8;
                $body
            }
            Dtype::Int16 => {
                type $T = i16;
                $body
            }
            Dtype::Int32 => {
                type $T = i32;
                $body
            }
            Dtype::Int64 => {
                type $T = i64;
                $body
            }
            Dtype::UInt8 => {
                type $T = u8;
                $body
            }
            other => Err(unsupported($op, other)),
        }
    };
}

macro_rules! bitwise_kernels {
    ($($(#[$doc:meta])* $binary:ident, $scalar:ident => $op:ident, $scalar_op:ident, $apply:expr;)*) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Default)]
            pub struct $binary {
                config: NativeConfig,
            }

            impl $binary {
                pub fn new(config: NativeConfig) -> Self {
                    Self { config }
                }
            }

            impl Kernel for $binary {
                fn name(&self) -> &'static str {
                    OpName::$op.as_str()
                }
            }

            impl BinaryKernel for $binary {
                fn call(&self, x1: &Array, x2: &Array, out: &Array) -> Result<()> {
                    with_bitwise_type!(OpName::$op, out.dtype(), T => {
                        strided::binary::<T, _>(&self.config, x1, x2, out, $apply)
                    })
                }
            }

            $(#[$doc])*
            #[derive(Debug, Clone, Default)]
            pub struct $scalar {
                config: NativeConfig,
            }

            impl $scalar {
                pub fn new(config: NativeConfig) -> Self {
                    Self { config }
                }
            }

            impl Kernel for $scalar {
                fn name(&self) -> &'static str {
                    OpName::$scalar_op.as_str()
                }
            }

            impl ArrayScalarKernel for $scalar {
                fn call(&self, x1: &Array, x2: Scalar, out: &Array) -> Result<()> {
                    with_bitwise_type!(OpName::$scalar_op, out.dtype(), T => {
                        let value: T = x2.to_element();
                        strided::array_scalar::<T, _>(&self.config, x1, value, out, $apply)
                    })
                }
            }
        )*
    };
}

bitwise_kernels! {
    /// Elementwise `&`
    BitwiseAndKernel, BitwiseAndScalarKernel => BitwiseAnd, BitwiseAndAS, |a, b| a & b;
    /// Elementwise `|`
    BitwiseOrKernel, BitwiseOrScalarKernel => BitwiseOr, BitwiseOrAS, |a, b| a | b;
    /// Elementwise `^`
    BitwiseXorKernel, BitwiseXorScalarKernel => BitwiseXor, BitwiseXorAS, |a, b| a ^ b;
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndx_core::Device;

    fn array<T: ndx_core::Element>(data: Vec<T>, shape: &[usize]) -> Array {
        Array::from_vec(data, shape.to_vec(), Device::default()).unwrap()
    }

    #[test]
    fn test_kernel_names() {
        assert_eq!(BitwiseAndKernel::default().name(), "BitwiseAnd");
        assert_eq!(BitwiseAndScalarKernel::default().name(), "BitwiseAndAS");
        assert_eq!(BitwiseOrKernel::default().name(), "BitwiseOr");
        assert_eq!(BitwiseOrScalarKernel::default().name(), "BitwiseOrAS");
        assert_eq!(BitwiseXorKernel::default().name(), "BitwiseXor");
        assert_eq!(BitwiseXorScalarKernel::default().name(), "BitwiseXorAS");
    }

    #[test]
    fn test_bool_kernels() {
        let a = array(vec![true, false, true, false], &[4]);
        let b = array(vec![true, true, false, false], &[4]);
        let out = Array::zeros([4], Dtype::Bool, Device::default());

        BinaryKernel::call(&BitwiseAndKernel::default(), &a, &b, &out).unwrap();
        assert_eq!(out.to_vec::<bool>().unwrap(), vec![true, false, false, false]);
        BinaryKernel::call(&BitwiseOrKernel::default(), &a, &b, &out).unwrap();
        assert_eq!(out.to_vec::<bool>().unwrap(), vec![true, true, true, false]);
        BinaryKernel::call(&BitwiseXorKernel::default(), &a, &b, &out).unwrap();
        assert_eq!(out.to_vec::<bool>().unwrap(), vec![false, true, true, false]);
    }

    #[test]
    fn test_mixed_dtype_inputs_compute_in_output_type() {
        let a = array(vec![-1i8, 0x0f], &[2]);
        let b = array(vec![0x1234i32, 0x00ff], &[2]);
        let out = Array::zeros([2], Dtype::Int32, Device::default());

        BinaryKernel::call(&BitwiseAndKernel::default(), &a, &b, &out).unwrap();
        // -1i8 sign-extends to all ones
        assert_eq!(out.to_vec::<i32>().unwrap(), vec![0x1234, 0x0f]);

        let u = array(vec![0xffu8], &[1]);
        let i = array(vec![0i16], &[1]);
        let out = Array::zeros([1], Dtype::Int16, Device::default());
        BinaryKernel::call(&BitwiseOrKernel::default(), &u, &i, &out).unwrap();
        // uint8 zero-extends
        assert_eq!(out.to_vec::<i16>().unwrap(), vec![255]);
    }

    #[test]
    fn test_scalar_kernel() {
        let a = array(vec![6i64, 3], &[2]);
        let out = Array::zeros([2], Dtype::Int64, Device::default());
        ArrayScalarKernel::call(&BitwiseAndScalarKernel::default(), &a, Scalar::Int(2), &out)
            .unwrap();
        assert_eq!(out.to_vec::<i64>().unwrap(), vec![2, 2]);

        ArrayScalarKernel::call(&BitwiseXorScalarKernel::default(), &a, Scalar::Int(1), &out)
            .unwrap();
        assert_eq!(out.to_vec::<i64>().unwrap(), vec![7, 2]);
    }

    #[test]
    fn test_float_output_is_a_kernel_error() {
        let a = Array::zeros([2], Dtype::Float32, Device::default());
        let err = BinaryKernel::call(&BitwiseAndKernel::default(), &a, &a, &a).unwrap_err();
        assert!(matches!(err, Error::Kernel(_)));
        assert!(err.to_string().contains("float32"));
    }
}
