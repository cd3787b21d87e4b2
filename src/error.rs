use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The result type used across the crate.
pub type Result<T> = std::result::Result<T, FontError>;

/// All errors that can occur while loading data, configuring or running the search.
#[derive(Debug)]
pub enum FontError {
    /// The training set has no records.
    EmptyTrainingSet,
    /// A color channel is outside `0..=255`.
    ChannelOutOfRange {
        record: usize,
        channel: &'static str,
        value: i64,
    },
    /// A label is neither 0 nor 1.
    InvalidLabel { record: usize, label: i64 },
    /// A line of a CSV resource could not be parsed.
    Csv { line: usize, msg: String },
    /// Invalid search configuration, caught before the search starts.
    InvalidConfig(String),
    /// A parameter block has the wrong shape or an entry outside its bounds.
    InvalidSnapshot(String),
    /// The loss evaluated to NaN or infinity. Signals a broken invariant.
    NonFiniteLoss { iteration: usize, loss: f64 },
    Io(io::Error),
    Json(serde_json::Error),
}

impl Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTrainingSet => write!(f, "training set must not be empty"),
            Self::ChannelOutOfRange {
                record,
                channel,
                value,
            } => write!(
                f,
                "record {record}: {channel} channel is {value}, expected a value in 0..=255"
            ),
            Self::InvalidLabel { record, label } => {
                write!(f, "record {record}: label is {label}, expected 0 or 1")
            }
            Self::Csv { line, msg } => write!(f, "csv line {line}: {msg}"),
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::InvalidSnapshot(msg) => write!(f, "invalid snapshot: {msg}"),
            Self::NonFiniteLoss { iteration, loss } => {
                write!(f, "loss became {loss} at iteration {iteration}")
            }
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Json(e) => write!(f, "json error: {e}"),
        }
    }
}

impl Error for FontError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for FontError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for FontError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
