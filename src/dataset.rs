use std::{fs, path::Path};

use ndarray::{Array2, ArrayView2};

use crate::error::{FontError, Result};

/// Highest raw value of a color channel.
pub const CHANNEL_MAX: i64 = 255;

/// Rescales a raw `0..=255` channel into `[0.01, 1.0]`.
///
/// Used for both training and prediction inputs, keeping the two paths identical.
#[inline]
pub fn scale_channel(value: u8) -> f64 {
    value as f64 / CHANNEL_MAX as f64 * 0.99 + 0.01
}

/// A labeled background color as it comes from the outside world.
///
/// Channels are kept wide so out-of-range values can be rejected instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRecord {
    pub red: i64,
    pub green: i64,
    pub blue: i64,
    /// 1 when a dark font reads better, 0 when a light font does.
    pub label: i64,
}

impl ColorRecord {
    pub fn new(red: i64, green: i64, blue: i64, label: i64) -> Self {
        Self {
            red,
            green,
            blue,
            label,
        }
    }
}

/// Checks a raw channel value, returning it as a byte.
pub(crate) fn checked_channel(record: usize, channel: &'static str, value: i64) -> Result<u8> {
    u8::try_from(value).map_err(|_| FontError::ChannelOutOfRange {
        record,
        channel,
        value,
    })
}

/// The immutable batch the search is scored against.
///
/// Samples are stored column-wise:
/// - `inputs` has shape `(3, len)`, one scaled `(r, g, b)` column per sample.
/// - `targets` has shape `(2, len)`, row 0 is `label` and row 1 is `1 - label`.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    inputs: Array2<f64>,
    targets: Array2<f64>,
}

impl TrainingSet {
    /// Validates and scales the records.
    ///
    /// # Errors
    /// Returns an error if there are no records, a channel is outside `0..=255`
    /// or a label is not 0 or 1.
    pub fn from_records(records: &[ColorRecord]) -> Result<Self> {
        if records.is_empty() {
            return Err(FontError::EmptyTrainingSet);
        }

        let len = records.len();
        let mut inputs = Array2::<f64>::zeros((3, len));
        let mut targets = Array2::<f64>::zeros((2, len));

        for (i, rec) in records.iter().enumerate() {
            let channels = [
                checked_channel(i, "red", rec.red)?,
                checked_channel(i, "green", rec.green)?,
                checked_channel(i, "blue", rec.blue)?,
            ];

            let label = match rec.label {
                0 => 0.,
                1 => 1.,
                label => return Err(FontError::InvalidLabel { record: i, label }),
            };

            for (row, c) in channels.into_iter().enumerate() {
                inputs[[row, i]] = scale_channel(c);
            }
            targets[[0, i]] = label;
            targets[[1, i]] = 1. - label;
        }

        Ok(Self { inputs, targets })
    }

    /// Parses `red,green,blue,label` rows.
    ///
    /// A leading header row is skipped and blank lines are ignored.
    ///
    /// # Errors
    /// Returns `FontError::Csv` for malformed lines and any validation error of
    /// [`TrainingSet::from_records`].
    pub fn from_csv_str(content: &str) -> Result<Self> {
        let mut records = Vec::new();
        let mut first_row = true;

        for (idx, raw) in content.lines().enumerate() {
            let line = idx + 1;
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }

            let fields: Vec<_> = raw.split(',').map(str::trim).collect();
            let is_header = first_row && fields[0].parse::<i64>().is_err();
            first_row = false;

            if is_header {
                continue;
            }

            if fields.len() != 4 {
                return Err(FontError::Csv {
                    line,
                    msg: format!("expected 4 fields, got {}", fields.len()),
                });
            }

            let mut values = [0i64; 4];
            for (v, field) in values.iter_mut().zip(&fields) {
                *v = field.parse().map_err(|e| FontError::Csv {
                    line,
                    msg: format!("'{field}' is not an integer: {e}"),
                })?;
            }

            let [red, green, blue, label] = values;
            records.push(ColorRecord::new(red, green, blue, label));
        }

        Self::from_records(&records)
    }

    /// Reads and parses a CSV file, see [`TrainingSet::from_csv_str`].
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_csv_str(&content)
    }

    /// Returns the number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.inputs.ncols()
    }

    /// True if there are no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The scaled inputs, shape `(3, len)`.
    #[inline]
    pub fn inputs(&self) -> ArrayView2<'_, f64> {
        self.inputs.view()
    }

    /// The target pairs, shape `(2, len)`.
    #[inline]
    pub fn targets(&self) -> ArrayView2<'_, f64> {
        self.targets.view()
    }
}
