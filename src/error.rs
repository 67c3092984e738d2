use core::fmt;

/// Result alias for `partscore`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by partition metrics and their collaborators.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Input was empty.
    EmptyInput,

    /// Two inputs that must line up have different lengths.
    LengthMismatch {
        /// Expected length.
        expected: usize,
        /// Found length.
        found: usize,
    },

    /// A node id does not exist in the graph (or is negative).
    NodeOutOfRange {
        /// Offending id, as given by the caller.
        node: i64,
        /// Number of nodes.
        num_nodes: usize,
    },

    /// An assignment label is outside `-1..k` (or `0..k` where unassigned is not allowed).
    LabelOutOfRange {
        /// Position in the assignment vector.
        index: usize,
        /// Offending label.
        label: i64,
        /// Number of partitions.
        num_partitions: usize,
    },

    /// The number of partitions must be positive.
    InvalidPartitionCount(usize),

    /// `2 * bits` does not fit in the packing word.
    PackingOverflow {
        /// Node count that was requested.
        num_nodes: usize,
        /// Bits needed per endpoint.
        bits: u32,
    },

    /// Invalid parameter value.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },

    /// Malformed line in a text input.
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// Reading or writing a file failed.
    Io(String),

    /// An external tool failed; carries the tool's log text.
    Collaborator(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyInput => write!(f, "empty input provided"),
            Error::LengthMismatch { expected, found } => {
                write!(f, "length mismatch: expected {expected}, found {found}")
            }
            Error::NodeOutOfRange { node, num_nodes } => {
                write!(f, "node id {node} out of range for {num_nodes} nodes")
            }
            Error::LabelOutOfRange {
                index,
                label,
                num_partitions,
            } => write!(
                f,
                "label {label} at position {index} out of range for {num_partitions} partitions"
            ),
            Error::InvalidPartitionCount(k) => {
                write!(f, "number of partitions must be positive, got {k}")
            }
            Error::PackingOverflow { num_nodes, bits } => write!(
                f,
                "cannot pack edges of {num_nodes} nodes: 2 x {bits} bits exceeds 63"
            ),
            Error::InvalidParameter { name, message } => {
                write!(f, "invalid parameter '{name}': {message}")
            }
            Error::Parse { line, message } => write!(f, "parse error on line {line}: {message}"),
            Error::Io(msg) => write!(f, "i/o error: {msg}"),
            Error::Collaborator(log) => write!(f, "external tool failed: {log}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
