//! Index-keyed latency store that reorders out-of-order completions.
use std::collections::BTreeMap;

/// Elapsed times keyed by request index.
///
/// Completions arrive in any order; iteration is always by ascending index.
/// A second insert for the same index replaces the first.
#[derive(Debug, Clone, Default)]
pub struct OrderedResultStore {
    entries: BTreeMap<usize, f64>,
}

impl OrderedResultStore {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Records `elapsed_ms` for `index`, returning the value it replaced.
    pub fn insert(&mut self, index: usize, elapsed_ms: f64) -> Option<f64> {
        self.entries.insert(index, elapsed_ms)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.entries.get(&index).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Values in ascending index order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.values().copied()
    }

    /// `(index, value)` pairs in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().map(|(index, value)| (*index, *value))
    }

    /// Drains the store into the ordered series.
    #[must_use]
    pub fn into_series(self) -> Vec<f64> {
        self.entries.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;

    #[test]
    fn random_permutations_drain_in_index_order() -> Result<(), String> {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for size in [0usize, 1, 2, 17, 256, 1000] {
            let mut indices: Vec<usize> = (0..size).collect();
            indices.shuffle(&mut rng);

            let mut store = OrderedResultStore::new();
            for index in &indices {
                let value = f64::from(u32::try_from(*index).map_err(|err| err.to_string())?);
                store.insert(*index, value);
            }

            let drained: Vec<usize> = store.iter().map(|(index, _)| index).collect();
            if drained.windows(2).any(|pair| pair.first() >= pair.last()) {
                return Err(format!("Indices not strictly increasing for size {}", size));
            }
            if drained != (0..size).collect::<Vec<_>>() {
                return Err(format!("Missing indices for size {}", size));
            }
            let series = store.into_series();
            let in_order = series
                .iter()
                .zip(0u32..)
                .all(|(value, expected)| (value - f64::from(expected)).abs() < f64::EPSILON);
            if series.len() != size || !in_order {
                return Err(format!("Series out of order for size {}", size));
            }
        }
        Ok(())
    }

    #[test]
    fn duplicate_index_keeps_last_write() -> Result<(), String> {
        let mut store = OrderedResultStore::new();
        if store.insert(3, 12.5).is_some() {
            return Err("First insert should not replace".to_owned());
        }
        let replaced = store.insert(3, 0.0);
        if replaced != Some(12.5) {
            return Err(format!("Expected replaced value 12.5, got {:?}", replaced));
        }
        if store.len() != 1 || store.get(3) != Some(0.0) {
            return Err("Expected a single entry holding the last write".to_owned());
        }
        Ok(())
    }

    #[test]
    fn values_ignore_insertion_order() -> Result<(), String> {
        let mut store = OrderedResultStore::new();
        store.insert(2, 30.0);
        store.insert(0, 10.0);
        store.insert(1, 0.0);
        let values: Vec<f64> = store.values().collect();
        if values != [10.0, 0.0, 30.0] {
            return Err(format!("Unexpected values: {:?}", values));
        }
        Ok(())
    }
}
