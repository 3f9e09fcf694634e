//! Small stateless helpers shared by the pipeline and the CLI

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::hash::Hash;
use std::path::Path;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{PlzmapError, Result};
use crate::table::RawTable;

/// Run `f` and log how long it took
pub fn timed<T>(stage: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let value = f();
    let secs = start.elapsed().as_secs_f64();
    tracing::info!(stage, secs = format!("{:.2}", secs).as_str(), "Stage finished");
    value
}

/// True if any item occurs more than once
pub fn has_duplicates<T, I>(items: I) -> bool
where
    T: Eq + Hash,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    items.into_iter().any(|item| !seen.insert(item))
}

/// Number of rows that repeat an earlier row exactly
pub fn duplicate_row_count(table: &RawTable) -> usize {
    let mut seen = HashSet::new();
    table.rows().iter().filter(|row| !seen.insert(*row)).count()
}

/// Serialize a value as pretty JSON into a file
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|source| PlzmapError::FileAccess {
        path: path.to_path_buf(),
        source,
    })
}

/// Deserialize a value from a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|source| PlzmapError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

/// Column order with a fixed leading part
///
/// Returns `fixed` followed by the remaining `columns` in their original
/// order, without the names in `remove` and without repeating fixed names.
pub fn dynamic_column_order(columns: &[String], fixed: &[&str], remove: &[&str]) -> Vec<String> {
    for name in remove {
        if !columns.iter().any(|c| c == name) {
            tracing::debug!(column = *name, "Column to remove not present");
        }
    }

    let mut order: Vec<String> = fixed.iter().map(|c| c.to_string()).collect();
    order.extend(
        columns
            .iter()
            .filter(|c| !remove.contains(&c.as_str()) && !fixed.contains(&c.as_str()))
            .cloned(),
    );
    order
}

/// Occurrence count per distinct item, sorted by item
pub fn count_freqs<T, I>(items: I) -> BTreeMap<T, usize>
where
    T: Ord,
    I: IntoIterator<Item = T>,
{
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }
    counts
}

/// Items of `a` that also occur in `b`, in the order of `a`, without repeats
pub fn intersect<T>(a: &[T], b: &[T]) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    let other: HashSet<&T> = b.iter().collect();
    let mut seen = HashSet::new();
    a.iter().filter(|x| other.contains(x) && seen.insert(*x)).cloned().collect()
}

/// Stable sort by key; ties keep their input order in both directions
pub fn sort_by_key_stable<T, K, F>(items: &mut [T], ascending: bool, key: F)
where
    K: Ord,
    F: Fn(&T) -> K,
{
    if ascending {
        items.sort_by(|a, b| key(a).cmp(&key(b)));
    } else {
        items.sort_by(|a, b| key(b).cmp(&key(a)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_timed_returns_value() {
        assert_eq!(timed("add", || 2 + 2), 4);
    }

    #[test]
    fn test_has_duplicates() {
        assert!(has_duplicates([10115, 10117, 10115]));
        assert!(!has_duplicates([10115, 10117]));
        assert!(!has_duplicates(Vec::<u32>::new()));
    }

    #[test]
    fn test_duplicate_row_count() {
        let table = RawTable::new(
            "t",
            vec!["a".into(), "b".into()],
            vec![
                vec!["1".into(), "x".into()],
                vec!["1".into(), "x".into()],
                vec!["1".into(), "y".into()],
            ],
        );
        assert_eq!(duplicate_row_count(&table), 1);
    }

    #[test]
    fn test_json_file_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("counts.json");
        let counts = count_freqs([10117u32, 10115, 10117]);

        write_json(&counts, &path).unwrap();
        let back: BTreeMap<u32, usize> = read_json(&path).unwrap();
        assert_eq!(back, counts);
    }

    #[test]
    fn test_read_json_missing_file() {
        let err = read_json::<Vec<u32>>(Path::new("/nonexistent/x.json")).unwrap_err();
        assert!(matches!(err, PlzmapError::FileAccess { .. }));
    }

    #[test]
    fn test_dynamic_column_order() {
        let columns: Vec<String> =
            ["Index", "Betreiber", "Postleitzahl", "Ort"].iter().map(|s| s.to_string()).collect();
        let order = dynamic_column_order(&columns, &["Postleitzahl"], &["Index", "ID"]);
        assert_eq!(order, vec!["Postleitzahl", "Betreiber", "Ort"]);
    }

    #[test]
    fn test_count_freqs_sorted_by_key() {
        let freqs = count_freqs(["b", "a", "b"]);
        assert_eq!(freqs.into_iter().collect::<Vec<_>>(), vec![("a", 1), ("b", 2)]);
    }

    #[test]
    fn test_intersect_keeps_left_order() {
        assert_eq!(intersect(&[3, 1, 2, 1], &[1, 3]), vec![3, 1]);
    }

    #[test]
    fn test_sort_by_key_stable_descending_keeps_ties() {
        let mut rows = vec![("a", 1), ("b", 2), ("c", 1), ("d", 2)];
        sort_by_key_stable(&mut rows, false, |r| r.1);
        assert_eq!(rows, vec![("b", 2), ("d", 2), ("a", 1), ("c", 1)]);

        sort_by_key_stable(&mut rows, true, |r| r.1);
        assert_eq!(rows, vec![("a", 1), ("c", 1), ("b", 2), ("d", 2)]);
    }
}
