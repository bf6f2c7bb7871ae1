//! Full outer join across the datasets produced per path group.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::datatype::{FastHasher, JoinKey, Record};

/// Join `datasets` on the named fields, keeping every key present in any of
/// them.
///
/// Each dataset is indexed by its records' join keys; a record with any
/// join field absent (or null) is excluded entirely, and only the first
/// record under a key within one dataset is kept. The joined record for a
/// key overlays the matching records' fields in dataset order, so later
/// datasets overwrite earlier ones on field-name collision. The order of
/// keys in the output is unspecified; callers must not rely on it.
pub fn join_datasets(datasets: Vec<Vec<Record>>, on: &[String]) -> Vec<Record> {
    let mut indexes: Vec<HashMap<JoinKey, Record, FastHasher>> =
        Vec::with_capacity(datasets.len());
    for dataset in datasets {
        let mut index: HashMap<JoinKey, Record, FastHasher> = HashMap::default();
        for record in dataset {
            let Some(key) = JoinKey::from_record(&record, on) else {
                continue;
            };
            index.entry(key).or_insert(record);
        }
        trace!(keyed = index.len(), "indexed dataset for join");
        indexes.push(index);
    }

    let mut seen: HashSet<JoinKey, FastHasher> = HashSet::default();
    let mut joined = Vec::new();
    for at in 0..indexes.len() {
        for key in indexes[at].keys() {
            if !seen.insert(key.clone()) {
                continue;
            }
            let mut combined = Record::new();
            for index in &indexes {
                if let Some(record) = index.get(key) {
                    for (field, value) in record {
                        combined.insert(field.clone(), value.clone());
                    }
                }
            }
            joined.push(combined);
        }
    }
    joined
}
