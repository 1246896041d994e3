//! Version-stamped caches for derived datasets.

use crate::view::ViewContext;

/// A value tagged with the key it was computed for.
///
/// The value is only reused while the key compares equal; any change to the
/// inputs that feed the key forces a recompute on the next refresh.
#[derive(Debug, Clone)]
pub(crate) struct Stamped<K, V> {
    key: Option<K>,
    value: V,
}

impl<K, V: Default> Default for Stamped<K, V> {
    fn default() -> Self {
        Self {
            key: None,
            value: V::default(),
        }
    }
}

impl<K: PartialEq, V> Stamped<K, V> {
    /// Check whether the cached value was computed for `key`.
    pub(crate) fn is_current(&self, key: &K) -> bool {
        self.key.as_ref() == Some(key)
    }

    /// Store a freshly computed value.
    pub(crate) fn store(&mut self, key: K, value: V) {
        self.key = Some(key);
        self.value = value;
    }

    /// Forget the key so the next refresh recomputes.
    pub(crate) fn invalidate(&mut self) {
        self.key = None;
    }

    /// Access the cached value.
    pub(crate) fn value(&self) -> &V {
        &self.value
    }
}

/// Inputs of the mapped (transformed, unclipped) dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MappedKey {
    pub(crate) data_generation: u64,
    pub(crate) mapping_generation: u64,
}

/// Inputs of the display dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DisplayKey {
    pub(crate) data_generation: u64,
    pub(crate) options_generation: u64,
    pub(crate) view: Option<ViewContext>,
}

/// The series actually handed to the child renderers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayDataset {
    /// Displayed X values.
    pub x: Vec<f64>,
    /// Displayed Y values.
    pub y: Vec<f64>,
    /// Displayed connectivity, present when an explicit vector was supplied.
    pub connect: Option<Vec<bool>>,
    /// Downsampling factor that produced this dataset.
    pub downsample: usize,
}

impl DisplayDataset {
    /// Number of displayed points.
    pub fn len(&self) -> usize {
        self.y.len()
    }

    /// Check if nothing is displayed.
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamped_value_tracks_its_key() {
        let mut cache: Stamped<MappedKey, Vec<f64>> = Stamped::default();
        let key = MappedKey {
            data_generation: 1,
            mapping_generation: 0,
        };
        assert!(!cache.is_current(&key));
        cache.store(key, vec![1.0]);
        assert!(cache.is_current(&key));
        assert!(!cache.is_current(&MappedKey {
            data_generation: 2,
            ..key
        }));
        cache.invalidate();
        assert!(!cache.is_current(&key));
        assert_eq!(cache.value(), &vec![1.0]);
    }
}
