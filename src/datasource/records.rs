//! Structured record arrays with named fields.

use super::InputShapeError;
use super::column::Column;

/// A structured array: named numeric fields sharing one length.
///
/// Field order follows insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordArray {
    fields: Vec<(String, Column)>,
}

impl RecordArray {
    /// Create an empty record array.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, rejecting columns whose length disagrees with existing fields.
    pub fn with_field(
        mut self,
        name: impl Into<String>,
        column: impl Into<Column>,
    ) -> Result<Self, InputShapeError> {
        self.insert(name, column)?;
        Ok(self)
    }

    /// Add or replace a field.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        column: impl Into<Column>,
    ) -> Result<(), InputShapeError> {
        let name = name.into();
        let column = column.into();
        if let Some((_, other)) = self.fields.iter().find(|(n, _)| *n != name)
            && other.len() != column.len()
        {
            return Err(InputShapeError::FieldLength {
                field: name,
                expected: other.len(),
                found: column.len(),
            });
        }
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = column,
            None => self.fields.push((name, column)),
        }
        Ok(())
    }

    /// Build a record array from (x, y) tuples.
    pub fn from_xy(records: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let (x, y): (Vec<f64>, Vec<f64>) = records.into_iter().unzip();
        Self {
            fields: vec![("x".to_owned(), Column::F64(x)), ("y".to_owned(), Column::F64(y))],
        }
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Column> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, column)| column)
    }

    /// Field names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.fields.first().map_or(0, |(_, column)| column.len())
    }

    /// Check if there are no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
