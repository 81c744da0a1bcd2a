use std::fmt::{self, Display};

use crate::AsValue;

/// Dynamically typed cell value.
///
/// Every typed variant wraps an `Option`: `None` is a NULL that still knows the
/// column type it came from, while [`Value::Null`] is an untyped NULL.
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int64(Option<i64>),
    Float64(Option<f64>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l == r,
            (Self::Varchar(l), Self::Varchar(r)) => l == r,
            (Self::Blob(l), Self::Blob(r)) => l == r,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(
            self,
            Value::Null
                | Value::Boolean(None)
                | Value::Int64(None)
                | Value::Float64(None)
                | Value::Varchar(None)
                | Value::Blob(None)
        )
    }

    pub fn same_type(&self, other: &Self) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }

    /// Integer form of the value, truncating floats and parsing numeric text.
    ///
    /// Returns `None` for NULL, blobs, non numeric text and floats outside
    /// the `i64` range.
    pub fn to_integer(&self) -> Option<i64> {
        match self {
            Value::Boolean(Some(v)) => Some(*v as i64),
            Value::Int64(Some(v)) => Some(*v),
            Value::Float64(Some(v)) => float_to_integer(*v),
            Value::Varchar(Some(v)) => match i64::parse(v.trim()) {
                Ok(v) => Some(v),
                Err(_) => f64::parse(v.trim()).ok().and_then(float_to_integer),
            },
            _ => None,
        }
    }
}

/// `i64::MAX as f64` rounds up to 2^63, hence the exclusive upper bound.
fn float_to_integer(value: f64) -> Option<i64> {
    let value = value.trunc();
    (value >= i64::MIN as f64 && value < i64::MAX as f64).then_some(value as i64)
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            v if v.is_null() => f.write_str("NULL"),
            Value::Boolean(Some(v)) => write!(f, "{}", v),
            Value::Int64(Some(v)) => write!(f, "{}", v),
            Value::Float64(Some(v)) => write!(f, "{}", v),
            Value::Varchar(Some(v)) => f.write_str(v),
            Value::Blob(Some(v)) => f.write_str(&hex::encode_upper(v)),
            _ => unreachable!(),
        }
    }
}
