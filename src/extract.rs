//! Recursive path extraction and scope-based record assembly.
//!
//! Extraction walks one path through the document, fanning out over every
//! sequence a wildcard component matches and recording the index it took at
//! each one. Those recorded indexes — the item's coordinates — are what
//! later lets values extracted by different paths of the same group be
//! reassembled into coherent records: two items belong together when their
//! coordinates agree on every variable they share.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use tracing::trace;

use crate::datatype::Record;

lazy_static! {
    // (prefix)?({var}|*)(suffix)? over the whole component; the greedy
    // prefix means the last wildcard marker in the component wins
    static ref WILDCARD: Regex = Regex::new(r"^(.*)(?:\{(\w+)\}|\*)(.*)$").unwrap();
}

// ------------- Coordinates -------------
/// The wildcard variable bindings accumulated along one traversal, in
/// binding order: each entry maps a variable name to the sequence index the
/// traversal took there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coordinates {
    bindings: Vec<(String, usize)>,
}

impl Coordinates {
    pub fn new() -> Self {
        Self::default()
    }
    /// Number of bindings, i.e. how many sequence dimensions the traversal
    /// has descended through.
    pub fn depth(&self) -> usize {
        self.bindings.len()
    }
    pub fn get(&self, name: &str) -> Option<usize> {
        self.bindings
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, index)| *index)
    }
    /// A copy of these coordinates with `name` bound to `index`.
    pub fn with(&self, name: &str, index: usize) -> Self {
        let mut bindings = self.bindings.clone();
        match bindings.iter_mut().find(|(bound, _)| bound == name) {
            Some((_, at)) => *at = index,
            None => bindings.push((name.to_string(), index)),
        }
        Self { bindings }
    }
    /// True when the two coordinate sets agree on every variable name
    /// present in both. An empty intersection trivially agrees.
    pub fn agrees_with(&self, other: &Coordinates) -> bool {
        self.bindings
            .iter()
            .all(|(name, index)| other.get(name).is_none_or(|bound| bound == *index))
    }
}

/// One matched leaf (or subtree): the value, the coordinates of the
/// iteration contexts it was found under, and the output key of the path
/// that produced it.
#[derive(Debug, Clone)]
pub struct ExtractedItem<'v> {
    pub value: &'v Value,
    pub coords: Coordinates,
    pub key: String,
}

// ------------- Extraction -------------
/// Walk `document` along `components`, appending every match to `out`.
///
/// A component containing a wildcard marker resolves its literal prefix (if
/// any) as a field lookup, re-prepends its literal suffix (if any) onto the
/// remaining components, and iterates the resolved sequence by index,
/// binding the index under the wildcard's variable. Unnamed wildcards get a
/// synthesized variable name qualified by `ordinal` (the path's position
/// within its group), so unnamed wildcards of different paths never compare
/// for scope agreement. Anything that fails to line up with the document —
/// a missing field, a non-sequence where a sequence was expected — prunes
/// that branch silently.
pub fn extract<'v>(
    document: &'v Value,
    components: &[String],
    coords: &Coordinates,
    key: &str,
    ordinal: usize,
    out: &mut Vec<ExtractedItem<'v>>,
) {
    let Some((head, tail)) = components.split_first() else {
        out.push(ExtractedItem {
            value: document,
            coords: coords.clone(),
            key: key.to_string(),
        });
        return;
    };
    if let Some(captures) = WILDCARD.captures(head) {
        let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
        let suffix = captures.get(3).map(|m| m.as_str()).unwrap_or("");
        let segment = if prefix.is_empty() {
            Some(document)
        } else {
            document.get(prefix)
        };
        let rebuilt;
        let tail: &[String] = if suffix.is_empty() {
            tail
        } else {
            rebuilt = std::iter::once(suffix.to_string())
                .chain(tail.iter().cloned())
                .collect::<Vec<_>>();
            &rebuilt
        };
        if let Some(Value::Array(elements)) = segment {
            let variable = match captures.get(2) {
                Some(name) => name.as_str().to_string(),
                None => format!("_anon_{}_{}", ordinal, coords.depth()),
            };
            for (index, element) in elements.iter().enumerate() {
                extract(element, tail, &coords.with(&variable, index), key, ordinal, out);
            }
        }
    } else if let Value::Object(fields) = document
        && let Some(child) = fields.get(head)
    {
        extract(child, tail, coords, key, ordinal, out);
    }
}

// ------------- Scope joining -------------
/// Reassemble one group's extracted items into records.
///
/// Items are grouped by output key in first-seen key order. The base group
/// is the first one whose deepest item has maximal coordinate depth; each
/// of its items seeds one record, in extraction order. Every other group
/// contributes the first of its items whose coordinates agree with the base
/// item's — so a wildcard-free path attaches to every record, and when
/// several sibling items agree equally the earliest extracted one wins.
pub fn join_by_scope(items: Vec<ExtractedItem<'_>>) -> Vec<Record> {
    let mut groups: Vec<(String, Vec<ExtractedItem>)> = Vec::new();
    for item in items {
        match groups.iter_mut().find(|(key, _)| *key == item.key) {
            Some((_, grouped)) => grouped.push(item),
            None => groups.push((item.key.clone(), vec![item])),
        }
    }
    if groups.is_empty() {
        return Vec::new();
    }

    let mut base_at = 0;
    let mut base_depth = 0;
    for (at, (_, grouped)) in groups.iter().enumerate() {
        let deepest = grouped
            .iter()
            .map(|item| item.coords.depth())
            .max()
            .unwrap_or(0);
        if deepest > base_depth {
            base_depth = deepest;
            base_at = at;
        }
    }
    trace!(
        groups = groups.len(),
        base = %groups[base_at].0,
        depth = base_depth,
        "joining extracted items by scope"
    );

    let (base_key, base_items) = &groups[base_at];
    let mut records = Vec::with_capacity(base_items.len());
    for base in base_items {
        let mut record = Record::new();
        record.insert(base_key.clone(), base.value.clone());
        for (at, (key, grouped)) in groups.iter().enumerate() {
            if at == base_at {
                continue;
            }
            if let Some(matched) = grouped
                .iter()
                .find(|item| base.coords.agrees_with(&item.coords))
            {
                record.insert(key.clone(), matched.value.clone());
            }
        }
        records.push(record);
    }
    records
}
