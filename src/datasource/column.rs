//! Typed numeric columns.

/// Element type of a stored column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// Unsigned 8-bit integers. Boolean input is stored this way.
    U8,
    /// Signed 16-bit integers.
    I16,
    /// Signed 32-bit integers.
    I32,
    /// Signed 64-bit integers.
    I64,
    /// Single precision floats.
    F32,
    /// Double precision floats.
    F64,
}

/// A column of numbers keeping the element type it was supplied with.
///
/// Raw data is stored as given so it can be read back verbatim. Everything
/// downstream (transforms, clipping, bounds) works on `f64`.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Unsigned bytes (also the storage for booleans).
    U8(Vec<u8>),
    /// Signed 16-bit integers.
    I16(Vec<i16>),
    /// Signed 32-bit integers.
    I32(Vec<i32>),
    /// Signed 64-bit integers.
    I64(Vec<i64>),
    /// Single precision floats.
    F32(Vec<f32>),
    /// Double precision floats.
    F64(Vec<f64>),
}

macro_rules! for_each_column {
    ($column:expr, $values:ident => $body:expr) => {
        match $column {
            Column::U8($values) => $body,
            Column::I16($values) => $body,
            Column::I32($values) => $body,
            Column::I64($values) => $body,
            Column::F32($values) => $body,
            Column::F64($values) => $body,
        }
    };
}

impl Column {
    /// A column of consecutive indices `0..len`.
    pub fn index(len: usize) -> Self {
        Self::F64((0..len).map(|i| i as f64).collect())
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        for_each_column!(self, values => values.len())
    }

    /// Check if the column has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element type.
    pub fn dtype(&self) -> DType {
        match self {
            Self::U8(_) => DType::U8,
            Self::I16(_) => DType::I16,
            Self::I32(_) => DType::I32,
            Self::I64(_) => DType::I64,
            Self::F32(_) => DType::F32,
            Self::F64(_) => DType::F64,
        }
    }

    /// Read one element as `f64`.
    pub fn get(&self, index: usize) -> Option<f64> {
        for_each_column!(self, values => values.get(index).map(|v| *v as f64))
    }

    /// Convert the whole column to `f64`.
    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            Self::F64(values) => values.clone(),
            other => for_each_column!(other, values => values.iter().map(|v| *v as f64).collect()),
        }
    }

    /// Minimum and maximum over finite elements.
    ///
    /// Bounds are always reported as `f64`, whatever the stored type.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        for_each_column!(self, values => finite_bounds(values.iter().map(|v| *v as f64)))
    }
}

pub(crate) fn finite_bounds(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let mut out: Option<(f64, f64)> = None;
    for value in values {
        if !value.is_finite() {
            continue;
        }
        out = Some(match out {
            None => (value, value),
            Some((min, max)) => (min.min(value), max.max(value)),
        });
    }
    out
}

impl From<Vec<bool>> for Column {
    fn from(values: Vec<bool>) -> Self {
        Self::U8(values.into_iter().map(u8::from).collect())
    }
}

impl From<&[bool]> for Column {
    fn from(values: &[bool]) -> Self {
        Self::U8(values.iter().map(|v| u8::from(*v)).collect())
    }
}

macro_rules! column_from {
    ($ty:ty, $variant:ident) => {
        impl From<Vec<$ty>> for Column {
            fn from(values: Vec<$ty>) -> Self {
                Self::$variant(values)
            }
        }

        impl From<&[$ty]> for Column {
            fn from(values: &[$ty]) -> Self {
                Self::$variant(values.to_vec())
            }
        }

        impl<const N: usize> From<[$ty; N]> for Column {
            fn from(values: [$ty; N]) -> Self {
                Self::$variant(values.to_vec())
            }
        }
    };
}

column_from!(u8, U8);
column_from!(i16, I16);
column_from!(i32, I32);
column_from!(i64, I64);
column_from!(f32, F32);
column_from!(f64, F64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_input_is_stored_as_u8() {
        let column = Column::from(vec![true, false, true]);
        assert_eq!(column.dtype(), DType::U8);
        assert_eq!(column, Column::U8(vec![1, 0, 1]));
    }

    #[test]
    fn bounds_are_floats_for_every_dtype() {
        let columns = [
            Column::from(vec![true, false]),
            Column::from(vec![0_u8, 1]),
            Column::from(vec![0_i16, 1]),
            Column::from(vec![0.0_f64, 1.0]),
        ];
        for column in columns {
            let (min, max): (f64, f64) = column.bounds().expect("non-empty column");
            assert_eq!(min, 0.0);
            assert_eq!(max, 1.0);
        }
    }

    #[test]
    fn bounds_skip_non_finite_values() {
        let column = Column::from(vec![f64::NAN, -2.0, f64::INFINITY, 3.0]);
        assert_eq!(column.bounds(), Some((-2.0, 3.0)));
        assert_eq!(Column::from(vec![f64::NAN]).bounds(), None);
    }

    #[test]
    fn index_column_counts_up() {
        let column = Column::index(3);
        assert_eq!(column.to_f64(), vec![0.0, 1.0, 2.0]);
        assert_eq!(column.get(5), None);
    }
}
