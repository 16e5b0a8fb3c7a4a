use thiserror::Error;

pub type MResult<T> = Result<T, MultiArrayError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MultiArrayError {
    #[error("negative extent {value} on axis {axis}")]
    NegativeExtent { axis: usize, value: i128 },
    #[error("rank mismatch: expected {expected}, got {got}")]
    RankMismatch { expected: usize, got: usize },
    #[error("storage holds {storage} elements but shape needs {shape}")]
    SizeMismatch { storage: usize, shape: usize },
    #[error("shifted shape addresses {required} elements but storage holds {storage}")]
    WindowOutOfBounds { required: usize, storage: usize },
    #[error("jagged array rejected: row {row} has {got} elements, expected {expected}")]
    JaggedRows {
        row: usize,
        expected: usize,
        got: usize,
    },
    #[error("cannot reshape a shape whose offset is not at the origin")]
    ShiftedReshape,
    #[error("owning storage cannot hold a shape whose offset is not at the origin")]
    ShiftedOwner,
    #[error("fixed shape {current:?} cannot be reshaped to {requested:?}")]
    FixedReshape {
        current: Vec<usize>,
        requested: Vec<usize>,
    },
    #[error("memory view of {capacity} elements cannot grow to {requested}")]
    ViewCapacityExceeded { capacity: usize, requested: usize },
    #[error("coordinate {coordinate} out of range for axis {axis} of extent {extent}")]
    CoordinateOutOfRange {
        axis: usize,
        coordinate: i128,
        extent: usize,
    },
    #[error("not implemented: {0}")]
    NotImplemented(String),
}

impl From<String> for MultiArrayError {
    fn from(e: String) -> Self {
        MultiArrayError::NotImplemented(e)
    }
}
