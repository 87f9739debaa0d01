//! Element datatype tags.
//!
//! Every reader, writer and iterator reports exactly one [`Datatype`], so a
//! caller can pick the correctly-typed access path without inspecting values.

use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::TensorustError;

/// The closed set of element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Boolean,
    Object,
}

impl Datatype {
    /// All tags, in declaration order.
    pub const ALL: [Datatype; 8] = [
        Datatype::Int8,
        Datatype::Int16,
        Datatype::Int32,
        Datatype::Int64,
        Datatype::Float32,
        Datatype::Float64,
        Datatype::Boolean,
        Datatype::Object,
    ];

    /// Returns the stable lowercase name of this tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Datatype::Int8 => "int8",
            Datatype::Int16 => "int16",
            Datatype::Int32 => "int32",
            Datatype::Int64 => "int64",
            Datatype::Float32 => "float32",
            Datatype::Float64 => "float64",
            Datatype::Boolean => "boolean",
            Datatype::Object => "object",
        }
    }

    /// Size of one element in bytes, or `None` for objects.
    pub fn size_bytes(self) -> Option<usize> {
        match self {
            Datatype::Int8 | Datatype::Boolean => Some(1),
            Datatype::Int16 => Some(2),
            Datatype::Int32 | Datatype::Float32 => Some(4),
            Datatype::Int64 | Datatype::Float64 => Some(8),
            Datatype::Object => None,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Datatype::Int8 | Datatype::Int16 | Datatype::Int32 | Datatype::Int64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, Datatype::Float32 | Datatype::Float64)
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Datatype {
    type Err = TensorustError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Datatype::ALL
            .into_iter()
            .find(|dt| dt.as_str() == s)
            .ok_or_else(|| TensorustError::UnknownDatatype(s.to_string()))
    }
}

/// A generic object element.
pub type Object = Arc<dyn Any + Send + Sync>;

/// A Rust type that can be stored in a typed buffer.
pub trait Element: Clone + Send + Sync + 'static {
    /// The tag reported by capabilities over this element type.
    const DATATYPE: Datatype;
}

macro_rules! impl_element {
    ($($ty:ty => $tag:ident),+ $(,)?) => {
        $(
            impl Element for $ty {
                const DATATYPE: Datatype = Datatype::$tag;
            }
        )+
    };
}

impl_element! {
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    bool => Boolean,
    Object => Object,
}
