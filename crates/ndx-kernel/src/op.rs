//! Operation identities
//!
//! Every logical operation variant has exactly one stable name. The registry
//! is keyed by these strings so backends compiled separately agree on them;
//! inside the workspace the `OpName` enum keeps them compile-time checked.

use ndx_core::{Dtype, Error, Result};
use std::fmt;
use std::str::FromStr;

/// Operand layout a kernel is written against
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KernelVariant {
    /// Two array operands
    ArrayArray,
    /// Array left operand, scalar right operand
    ArrayScalar,
}

/// Groups operations that share a dtype domain and in-place policy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpFamily {
    Bitwise,
}

impl OpFamily {
    /// Dtypes the family is defined on
    pub fn supports(self, dtype: Dtype) -> bool {
        match self {
            OpFamily::Bitwise => dtype.is_integral(),
        }
    }

    /// Whether the output may be the exact same view as an input
    pub fn tolerates_inplace(self) -> bool {
        match self {
            OpFamily::Bitwise => true,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OpFamily::Bitwise => "bitwise",
        }
    }
}

/// Identity of an operation variant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OpName {
    BitwiseAnd,
    BitwiseAndAS,
    BitwiseOr,
    BitwiseOrAS,
    BitwiseXor,
    BitwiseXorAS,
}

impl OpName {
    pub const ALL: [OpName; 6] = [
        OpName::BitwiseAnd,
        OpName::BitwiseAndAS,
        OpName::BitwiseOr,
        OpName::BitwiseOrAS,
        OpName::BitwiseXor,
        OpName::BitwiseXorAS,
    ];

    /// The registry key for this operation
    pub const fn as_str(self) -> &'static str {
        match self {
            OpName::BitwiseAnd => "BitwiseAnd",
            OpName::BitwiseAndAS => "BitwiseAndAS",
            OpName::BitwiseOr => "BitwiseOr",
            OpName::BitwiseOrAS => "BitwiseOrAS",
            OpName::BitwiseXor => "BitwiseXor",
            OpName::BitwiseXorAS => "BitwiseXorAS",
        }
    }

    pub fn variant(self) -> KernelVariant {
        match self {
            OpName::BitwiseAnd | OpName::BitwiseOr | OpName::BitwiseXor => KernelVariant::ArrayArray,
            OpName::BitwiseAndAS | OpName::BitwiseOrAS | OpName::BitwiseXorAS => {
                KernelVariant::ArrayScalar
            }
        }
    }

    pub fn family(self) -> OpFamily {
        OpFamily::Bitwise
    }

    /// The array-scalar twin of an operation (identity for AS variants)
    pub fn array_scalar(self) -> OpName {
        match self {
            OpName::BitwiseAnd | OpName::BitwiseAndAS => OpName::BitwiseAndAS,
            OpName::BitwiseOr | OpName::BitwiseOrAS => OpName::BitwiseOrAS,
            OpName::BitwiseXor | OpName::BitwiseXorAS => OpName::BitwiseXorAS,
        }
    }

    /// Whether swapping the operands leaves the result unchanged
    pub fn is_commutative(self) -> bool {
        match self.family() {
            OpFamily::Bitwise => true,
        }
    }
}

impl fmt::Display for OpName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OpName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        OpName::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| Error::UnknownOperation(s.to_string()))
    }
}
