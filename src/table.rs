use ahash::AHashMap;

/// Running statistics for one key, in tenths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aggregate {
    pub sum: i64,
    pub count: u64,
    pub min: i32,
    pub max: i32,
}

impl Aggregate {
    pub fn new(value: i32) -> Self {
        Self {
            sum: value as i64,
            count: 1,
            min: value,
            max: value,
        }
    }

    #[inline]
    pub fn add(&mut self, value: i32) {
        self.sum += value as i64;
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn absorb(&mut self, other: &Aggregate) {
        self.sum += other.sum;
        self.count += other.count;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn mean(&self) -> f64 {
        self.sum as f64 / (10.0 * self.count as f64)
    }

    pub fn min_value(&self) -> f64 {
        self.min as f64 / 10.0
    }

    pub fn max_value(&self) -> f64 {
        self.max as f64 / 10.0
    }
}

/// Typical number of distinct keys; the generator emits 500.
const CAPACITY_HINT: usize = 1 << 10;

/// Key to [`Aggregate`] map.
///
/// Only one thread folds into a table at a time; tables are combined
/// afterwards with [`AggregationTable::merge`].
#[derive(Debug, Clone, Default)]
pub struct AggregationTable {
    entries: AHashMap<Box<[u8]>, Aggregate>,
}

impl AggregationTable {
    pub fn new() -> Self {
        Self::with_capacity(CAPACITY_HINT)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: AHashMap::with_capacity(capacity),
        }
    }

    /// Folds one observation. The key is copied only the first time it is seen.
    #[inline]
    pub fn fold(&mut self, key: &[u8], value: i32) {
        match self.entries.get_mut(key) {
            Some(aggregate) => aggregate.add(value),
            None => {
                self.entries.insert(key.into(), Aggregate::new(value));
            }
        }
    }

    /// Combines `other` into `self`. Order does not matter.
    pub fn merge(&mut self, other: AggregationTable) {
        if self.entries.is_empty() {
            self.entries = other.entries;
            return;
        }
        for (key, aggregate) in other.entries {
            match self.entries.get_mut(&key) {
                Some(existing) => existing.absorb(&aggregate),
                None => {
                    self.entries.insert(key, aggregate);
                }
            }
        }
    }

    pub fn get(&self, key: &[u8]) -> Option<&Aggregate> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of records folded in, across all keys.
    pub fn records(&self) -> u64 {
        self.entries.values().map(|a| a.count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &Aggregate)> {
        self.entries.iter().map(|(k, v)| (&**k, v))
    }

    /// Entries ordered bytewise by key.
    pub fn sorted(&self) -> Vec<(&[u8], &Aggregate)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl<'a> Extend<(&'a [u8], i32)> for AggregationTable {
    fn extend<I: IntoIterator<Item = (&'a [u8], i32)>>(&mut self, records: I) {
        for (key, value) in records {
            self.fold(key, value);
        }
    }
}

impl<'a> FromIterator<(&'a [u8], i32)> for AggregationTable {
    fn from_iter<I: IntoIterator<Item = (&'a [u8], i32)>>(records: I) -> Self {
        let mut table = AggregationTable::new();
        table.extend(records);
        table
    }
}

/// Sequentially merges per-worker tables into one.
pub fn merge_all(tables: impl IntoIterator<Item = AggregationTable>) -> AggregationTable {
    tables
        .into_iter()
        .reduce(|mut merged, table| {
            merged.merge(table);
            merged
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(records: &[(&'static str, i32)]) -> AggregationTable {
        records.iter().map(|&(k, v)| (k.as_bytes(), v)).collect()
    }

    #[test]
    fn fold_inserts_then_updates() {
        let mut t = AggregationTable::new();
        t.fold(b"aa", 123);
        assert_eq!(t.get(b"aa"), Some(&Aggregate::new(123)));

        t.fold(b"aa", 71);
        assert_eq!(
            t.get(b"aa"),
            Some(&Aggregate {
                sum: 194,
                count: 2,
                min: 71,
                max: 123
            })
        );
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn folding_same_value_is_idempotent_on_min_max() {
        let mut t = AggregationTable::new();
        for _ in 0..1000 {
            t.fold(b"k", -37);
        }
        let a = t.get(b"k").unwrap();
        assert_eq!(a.count, 1000);
        assert_eq!(a.sum, -37_000);
        assert_eq!((a.min, a.max), (-37, -37));
    }

    #[test]
    fn merge_matches_single_table_in_any_order() {
        let records = [
            ("aa", 123),
            ("bb", -50),
            ("aa", 71),
            ("cc", 0),
            ("bb", 999),
            ("aa", -999),
            ("cc", 5),
        ];
        let whole = table(&records);

        let parts = [table(&records[..2]), table(&records[2..5]), table(&records[5..])];
        for order in [[0, 1, 2], [2, 1, 0], [1, 0, 2], [2, 0, 1]] {
            let merged = merge_all(order.iter().map(|&i| parts[i].clone()));
            assert_eq!(merged.sorted(), whole.sorted());
        }
    }

    #[test]
    fn merge_into_empty_takes_other() {
        let mut t = AggregationTable::new();
        t.merge(table(&[("x", 1)]));
        assert_eq!(t.get(b"x"), Some(&Aggregate::new(1)));
    }

    #[test]
    fn merge_all_of_nothing_is_empty() {
        assert!(merge_all(Vec::new()).is_empty());
    }

    #[test]
    fn derived_values() {
        let a = table(&[("aa", 123), ("aa", 71)]).get(b"aa").copied().unwrap();
        assert_eq!(a.mean(), 9.7);
        assert_eq!(a.min_value(), 7.1);
        assert_eq!(a.max_value(), 12.3);
    }

    #[test]
    fn record_count() {
        assert_eq!(table(&[("a", 1), ("b", 2), ("a", 3)]).records(), 3);
    }
}
