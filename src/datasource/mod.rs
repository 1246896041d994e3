//! Data ingestion and the reductions applied before rendering.
//!
//! Raw data arrives in one of several shapes ([`DataInput`]) and is normalized
//! into a pair of equal-length [`Column`]s. The [`clip`] and [`downsample`]
//! submodules shrink the display dataset to what the view can show.

pub mod clip;
mod column;
pub mod downsample;
mod records;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use column::{Column, DType};
pub use records::RecordArray;

pub(crate) use column::finite_bounds;

/// Errors raised when input data cannot be normalized into x/y columns.
///
/// A setter that returns one of these leaves the item untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputShapeError {
    /// X and Y have different lengths.
    #[error("x has {x} elements but y has {y}")]
    LengthMismatch {
        /// Length of the x data.
        x: usize,
        /// Length of the y data.
        y: usize,
    },
    /// A required field or key is absent.
    #[error("input has no `{0}` field")]
    MissingField(String),
    /// A record field disagrees with the length of the other fields.
    #[error("field `{field}` has {found} elements, expected {expected}")]
    FieldLength {
        /// Offending field.
        field: String,
        /// Length shared by the other fields.
        expected: usize,
        /// Length of the offending field.
        found: usize,
    },
    /// Some records carry an `x` value and others do not.
    #[error("records mix entries with and without `x`")]
    InconsistentRecords,
    /// Center step mode needs exactly one more x value than y values.
    #[error("center step mode needs len(x) == len(y) + 1, got x={x}, y={y}")]
    StepLength {
        /// Length of the x data.
        x: usize,
        /// Length of the y data.
        y: usize,
    },
    /// A connectivity vector does not match the data length.
    #[error("connect vector has {found} entries, expected {expected}")]
    ConnectLength {
        /// Number of data points.
        expected: usize,
        /// Number of connect entries.
        found: usize,
    },
}

/// Accepted input shapes for a data item.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DataInput {
    /// No data; clears the item.
    #[default]
    Empty,
    /// Y values only; X becomes `0..n`.
    Y(Column),
    /// Separate X and Y columns.
    XY(Column, Column),
    /// A mapping with a `y` key and an optional `x` key.
    Map(BTreeMap<String, Column>),
    /// A structured array with a `y` field and an optional `x` field.
    Records(RecordArray),
    /// An N×2 array of (x, y) rows.
    Points(Vec<[f64; 2]>),
    /// A list of `{x, y}` dictionaries.
    Dicts(Vec<BTreeMap<String, f64>>),
}

impl DataInput {
    /// Normalize into a pair of equal-length columns.
    ///
    /// Zero-length input of any shape yields `Ok(None)`. Center step mode
    /// accepts one extra X value.
    pub fn normalize(self, step_mode: StepMode) -> Result<Option<(Column, Column)>, InputShapeError> {
        let (x, y) = match self {
            Self::Empty => return Ok(None),
            Self::Y(y) => (None, y),
            Self::XY(x, y) => (Some(x), y),
            Self::Map(mut map) => {
                let y = map
                    .remove("y")
                    .ok_or_else(|| InputShapeError::MissingField("y".to_owned()))?;
                (map.remove("x"), y)
            }
            Self::Records(records) => {
                let y = records
                    .field("y")
                    .cloned()
                    .ok_or_else(|| InputShapeError::MissingField("y".to_owned()))?;
                (records.field("x").cloned(), y)
            }
            Self::Points(rows) => {
                let (x, y): (Vec<f64>, Vec<f64>) = rows.into_iter().map(|[x, y]| (x, y)).unzip();
                (Some(Column::F64(x)), Column::F64(y))
            }
            Self::Dicts(dicts) => normalize_dicts(dicts)?,
        };

        if y.is_empty() && x.as_ref().is_none_or(Column::is_empty) {
            return Ok(None);
        }
        let x = x.unwrap_or_else(|| match step_mode {
            StepMode::Center => Column::index(y.len() + 1),
            _ => Column::index(y.len()),
        });

        if step_mode == StepMode::Center {
            if x.len() != y.len() + 1 {
                return Err(InputShapeError::StepLength {
                    x: x.len(),
                    y: y.len(),
                });
            }
        } else if x.len() != y.len() {
            return Err(InputShapeError::LengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }
        Ok(Some((x, y)))
    }
}

fn normalize_dicts(
    dicts: Vec<BTreeMap<String, f64>>,
) -> Result<(Option<Column>, Column), InputShapeError> {
    let with_x = dicts.iter().filter(|d| d.contains_key("x")).count();
    if with_x != 0 && with_x != dicts.len() {
        return Err(InputShapeError::InconsistentRecords);
    }
    let mut xs = Vec::with_capacity(with_x);
    let mut ys = Vec::with_capacity(dicts.len());
    for dict in &dicts {
        let y = dict
            .get("y")
            .ok_or_else(|| InputShapeError::MissingField("y".to_owned()))?;
        ys.push(*y);
        if let Some(x) = dict.get("x") {
            xs.push(*x);
        }
    }
    let x = (with_x != 0).then_some(Column::F64(xs));
    Ok((x, Column::F64(ys)))
}

impl From<()> for DataInput {
    fn from(_: ()) -> Self {
        Self::Empty
    }
}

impl From<Column> for DataInput {
    fn from(y: Column) -> Self {
        Self::Y(y)
    }
}

impl<X: Into<Column>, Y: Into<Column>> From<(X, Y)> for DataInput {
    fn from((x, y): (X, Y)) -> Self {
        Self::XY(x.into(), y.into())
    }
}

impl From<RecordArray> for DataInput {
    fn from(records: RecordArray) -> Self {
        Self::Records(records)
    }
}

impl From<BTreeMap<String, Column>> for DataInput {
    fn from(map: BTreeMap<String, Column>) -> Self {
        Self::Map(map)
    }
}

impl From<Vec<[f64; 2]>> for DataInput {
    fn from(rows: Vec<[f64; 2]>) -> Self {
        Self::Points(rows)
    }
}

impl From<Vec<BTreeMap<String, f64>>> for DataInput {
    fn from(dicts: Vec<BTreeMap<String, f64>>) -> Self {
        Self::Dicts(dicts)
    }
}

macro_rules! input_from_y {
    ($($ty:ty),*) => {
        $(
            impl From<Vec<$ty>> for DataInput {
                fn from(y: Vec<$ty>) -> Self {
                    Self::Y(y.into())
                }
            }

            impl From<&[$ty]> for DataInput {
                fn from(y: &[$ty]) -> Self {
                    Self::Y(y.into())
                }
            }
        )*
    };
}

input_from_y!(bool, u8, i16, i32, i64, f32, f64);

/// How consecutive points are joined by the curve.
///
/// Entry `i` of an explicit vector says whether point `i` connects to point
/// `i + 1`; the last entry is unused.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Connect {
    /// Join every consecutive pair.
    #[default]
    All,
    /// Join points two by two: 0-1, 2-3, ...
    Pairs,
    /// Join consecutive pairs where both points are finite.
    Finite,
    /// Explicit per-point connectivity.
    Array(Vec<bool>),
}

impl Connect {
    /// Check whether point `index` connects to the next one.
    ///
    /// Non-finite endpoints never produce a segment regardless of the mode.
    pub fn joins(&self, index: usize) -> bool {
        match self {
            Self::All | Self::Finite => true,
            Self::Pairs => index % 2 == 0,
            Self::Array(values) => values.get(index).copied().unwrap_or(false),
        }
    }

    /// Access the explicit connectivity vector, if any.
    pub fn as_array(&self) -> Option<&[bool]> {
        match self {
            Self::Array(values) => Some(values),
            _ => None,
        }
    }
}

impl From<Vec<bool>> for Connect {
    fn from(values: Vec<bool>) -> Self {
        Self::Array(values)
    }
}

/// Step rendering mode of the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StepMode {
    /// Straight segments between points.
    #[default]
    None,
    /// Each y value spans the interval between two x edges; `len(x) == len(y) + 1`.
    Center,
    /// Steps start at each x value.
    Left,
    /// Steps end at each x value.
    Right,
}

/// First index with `values[i] >= target`, assuming ascending values.
pub(crate) fn lower_bound(values: &[f64], target: f64) -> usize {
    let mut left = 0;
    let mut right = values.len();
    while left < right {
        let mid = (left + right) / 2;
        if values[mid] < target {
            left = mid + 1;
        } else {
            right = mid;
        }
    }
    left
}
