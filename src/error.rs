use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TensorustError {
    #[error("Index {index} out of range for size {size}")]
    OutOfRange { index: i64, size: u64 },
    #[error("Iterator exhausted after {consumed} elements")]
    Exhausted { consumed: u64 },
    #[error("Index out of bounds: {0} for dimension of size {1} at axis {2}")]
    IndexOutOfBounds(i64, u64, usize),
    #[error("Invalid index: {0:?} for shape {1:?}")]
    InvalidIndex(Vec<i64>, Vec<u64>),
    #[error("Malformed metadata: {0}")]
    MalformedMetadata(String),
    #[error("Unknown datatype: {0}")]
    UnknownDatatype(String),
}

impl TensorustError {
    pub fn out_of_range(index: impl Into<i64>, size: u64) -> Self {
        Self::OutOfRange {
            index: index.into(),
            size,
        }
    }

    /// Out-of-range error for an unsigned logical index; indices past
    /// `i64::MAX` are reported as `i64::MAX`.
    pub fn out_of_range_u64(index: u64, size: u64) -> Self {
        Self::OutOfRange {
            index: i64::try_from(index).unwrap_or(i64::MAX),
            size,
        }
    }

    pub fn exhausted(consumed: u64) -> Self {
        Self::Exhausted { consumed }
    }

    pub fn index_out_of_bounds(index: i64, bound: u64, axis: usize) -> Self {
        Self::IndexOutOfBounds(index, bound, axis)
    }

    pub fn invalid_index(index: Vec<i64>, shape: Vec<u64>) -> Self {
        Self::InvalidIndex(index, shape)
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedMetadata(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, TensorustError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = TensorustError::index_out_of_bounds(4, 3, 1);
        assert_eq!(
            err.to_string(),
            "Index out of bounds: 4 for dimension of size 3 at axis 1"
        );

        let err = TensorustError::out_of_range_u64(u64::MAX, 2);
        assert_eq!(
            err,
            TensorustError::OutOfRange {
                index: i64::MAX,
                size: 2
            }
        );
    }
}
