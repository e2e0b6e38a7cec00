//! Error type shared by instance loading and the optimization engines.

use std::fmt;
use std::io;

/// Errors raised while loading an instance or configuring an engine.
///
/// Every variant is detected before optimization starts: an engine that
/// was successfully constructed never fails during its run.
#[derive(Debug)]
pub enum TspError {
    /// Underlying read failure
    Io(io::Error),
    /// No `DIMENSION` header where one is required
    DimensionNotFound,
    /// `DIMENSION` value is not a non-negative integer
    InvalidDimension(String),
    /// Unknown or unsupported `EDGE_WEIGHT_TYPE`
    UnsupportedEdgeWeightType(String),
    /// `EXPLICIT` instance without `EDGE_WEIGHT_FORMAT`
    EdgeWeightFormatNotFound,
    /// Unknown or unsupported `EDGE_WEIGHT_FORMAT`
    UnsupportedEdgeWeightFormat(String),
    /// Neither a coordinate nor an edge weight section was found
    MissingDataSection,
    /// A token could not be read as a number
    InvalidNumber { line: usize, token: String },
    /// A coordinate row has fewer than three fields
    MalformedCoordinate { line: usize },
    /// A node position is NaN or infinite
    InvalidCoordinate(String),
    /// Explicit section holds the wrong number of distance values
    UnexpectedValueCount { expected: usize, found: usize },
    /// Coordinate section disagrees with `DIMENSION`
    CoordinateCountMismatch { expected: usize, found: usize },
    /// The same node id appears twice
    DuplicateNode(String),
    /// Explicit matrix is not square
    NonSquareMatrix { rows: usize, row: usize, len: usize },
    /// Explicit matrix entry is negative or not finite
    InvalidDistance { from: usize, to: usize, value: f64 },
    /// Explicit matrix is not symmetric or has a non-zero diagonal
    AsymmetricMatrix { from: usize, to: usize },
    /// Fewer than two nodes: no route can be built
    TooFewNodes(usize),
    /// Engine parameter outside its valid range
    InvalidParameter(String),
    /// Operation needs node coordinates but the instance is explicit
    NoCoordinates,
}

pub type Result<T> = std::result::Result<T, TspError>;

impl fmt::Display for TspError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TspError::Io(e) => write!(f, "cannot read instance: {}", e),
            TspError::DimensionNotFound => write!(f, "dimension not found"),
            TspError::InvalidDimension(v) => write!(f, "invalid dimension: {:?}", v),
            TspError::UnsupportedEdgeWeightType(t) => {
                write!(f, "unsupported edge weight type: {}", t)
            }
            TspError::EdgeWeightFormatNotFound => {
                write!(f, "edge weight format not found for EXPLICIT instance")
            }
            TspError::UnsupportedEdgeWeightFormat(t) => {
                write!(f, "unsupported edge weight format: {}", t)
            }
            TspError::MissingDataSection => {
                write!(f, "no NODE_COORD_SECTION or EDGE_WEIGHT_SECTION found")
            }
            TspError::InvalidNumber { line, token } => {
                write!(f, "line {}: invalid number {:?}", line, token)
            }
            TspError::MalformedCoordinate { line } => {
                write!(f, "line {}: expected `id x y`", line)
            }
            TspError::InvalidCoordinate(id) => {
                write!(f, "node {} has a non-finite coordinate", id)
            }
            TspError::UnexpectedValueCount { expected, found } => write!(
                f,
                "unexpected number of distance values: expected {}, found {}",
                expected, found
            ),
            TspError::CoordinateCountMismatch { expected, found } => write!(
                f,
                "coordinate count does not match dimension: expected {}, found {}",
                expected, found
            ),
            TspError::DuplicateNode(id) => write!(f, "duplicate node id: {}", id),
            TspError::NonSquareMatrix { rows, row, len } => write!(
                f,
                "distance matrix is not square: row {} has {} entries, expected {}",
                row, len, rows
            ),
            TspError::InvalidDistance { from, to, value } => {
                write!(f, "invalid distance {} between {} and {}", value, from, to)
            }
            TspError::AsymmetricMatrix { from, to } => write!(
                f,
                "distance matrix is not symmetric with zero diagonal at ({}, {})",
                from, to
            ),
            TspError::TooFewNodes(n) => {
                write!(f, "instance has {} node(s), at least 2 are required", n)
            }
            TspError::InvalidParameter(msg) => write!(f, "invalid parameter: {}", msg),
            TspError::NoCoordinates => write!(f, "instance has no node coordinates"),
        }
    }
}

impl std::error::Error for TspError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TspError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TspError {
    fn from(e: io::Error) -> Self {
        TspError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_violation() {
        assert_eq!(TspError::DimensionNotFound.to_string(), "dimension not found");
        let msg = TspError::UnexpectedValueCount { expected: 3, found: 2 }.to_string();
        assert!(msg.contains("unexpected number of distance values"));
        assert!(msg.contains("expected 3"));
        assert_eq!(
            TspError::InvalidCoordinate("7".to_string()).to_string(),
            "node 7 has a non-finite coordinate"
        );
    }

    #[test]
    fn test_io_error_is_source() {
        use std::error::Error;
        let err = TspError::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(err.source().is_some());
        assert!(TspError::NoCoordinates.source().is_none());
    }
}
