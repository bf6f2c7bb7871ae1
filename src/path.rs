//! The textual surface of the engine: path expressions with optional
//! aliasing, reserved directives mixed into the same flat list, and the
//! grouping of paths that iterate the same collection.
//!
//! A path expression is a dotted traversal such as `students.{i}.name` or
//! `students.{i}.scores.{j}.v as score`. A directive is a reserved name
//! followed by a bracketed argument list, such as `join_by: [id]` or
//! `sort_by: [score DESC, name ASC]`. Directives are recognized here, once,
//! before any other stage sees the list.

use std::collections::HashMap;

use tracing::debug;

use crate::datatype::FastHasher;

const ALIAS_SEPARATOR: &str = " as ";

// ------------- PathExpr -------------
/// A parsed path expression: its dot-separated components and the output
/// key its values are emitted under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr {
    components: Vec<String>,
    key: String,
}

impl PathExpr {
    /// Split a path string into components and an output key. Everything
    /// after `" as "` is the key; otherwise the key is the last component.
    /// Component syntax is not validated here; wildcard recognition belongs
    /// to the extractor.
    pub fn parse(path: &str) -> Self {
        if let Some((raw, alias)) = path.split_once(ALIAS_SEPARATOR) {
            let components = split_components(raw);
            return Self {
                components,
                key: alias.trim().to_string(),
            };
        }
        let components = split_components(path);
        let key = components.last().cloned().unwrap_or_default();
        Self { components, key }
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The literal dotted prefix before the first wildcard-bearing
    /// component. A wildcard-free path is its own root.
    pub fn root(&self) -> String {
        let literal: Vec<&str> = self
            .components
            .iter()
            .take_while(|part| !part.contains(['{', '}', '*']))
            .map(String::as_str)
            .collect();
        literal.join(".")
    }
}

fn split_components(raw: &str) -> Vec<String> {
    raw.trim().split('.').map(str::to_string).collect()
}

// ------------- Directives -------------
/// The accumulated argument lists of every reserved directive found in a
/// spec list. A directive may appear more than once; arguments accumulate
/// in input order.
#[derive(Debug, Clone, Default)]
pub struct Directives {
    pub join_by: Vec<String>,
    pub filter_by: Vec<String>,
    pub sort_by: Vec<String>,
    /// Accepted and accumulated, consumed by no stage yet.
    pub group_by: Vec<String>,
}

impl Directives {
    fn slot(&mut self, name: &str) -> Option<&mut Vec<String>> {
        match name {
            "join_by" => Some(&mut self.join_by),
            "filter_by" => Some(&mut self.filter_by),
            "sort_by" => Some(&mut self.sort_by),
            "group_by" => Some(&mut self.group_by),
            _ => None,
        }
    }
}

/// Separate a flat spec list into data paths and directives.
///
/// A string is a directive when the part before its first `:` trims to a
/// reserved name; its value has one leading `[` and one trailing `]`
/// stripped and is split on `,` into trimmed, non-empty arguments. Every
/// other string is parsed as a data path.
pub fn split_specs<S: AsRef<str>>(specs: &[S]) -> (Vec<PathExpr>, Directives) {
    let mut paths = Vec::new();
    let mut directives = Directives::default();
    for spec in specs {
        let spec = spec.as_ref();
        if let Some((name, value)) = spec.split_once(':')
            && let Some(slot) = directives.slot(name.trim())
        {
            let mut value = value.trim();
            value = value.strip_prefix('[').unwrap_or(value);
            value = value.strip_suffix(']').unwrap_or(value);
            let arguments = value
                .split(',')
                .map(str::trim)
                .filter(|argument| !argument.is_empty())
                .map(str::to_string);
            slot.extend(arguments);
            continue;
        }
        paths.push(PathExpr::parse(spec));
    }
    debug!(
        paths = paths.len(),
        join_by = directives.join_by.len(),
        filter_by = directives.filter_by.len(),
        sort_by = directives.sort_by.len(),
        "split path specs"
    );
    (paths, directives)
}

// ------------- Grouping -------------
/// The paths sharing one literal root, extracted together as one dataset.
#[derive(Debug, Clone)]
pub struct PathGroup {
    pub root: String,
    pub paths: Vec<PathExpr>,
}

/// Partition paths by their root, preserving first-seen group order and
/// input order within each group.
pub fn group_by_root(paths: Vec<PathExpr>) -> Vec<PathGroup> {
    let mut groups: Vec<PathGroup> = Vec::new();
    let mut by_root: HashMap<String, usize, FastHasher> = HashMap::default();
    for path in paths {
        let root = path.root();
        match by_root.get(&root) {
            Some(&at) => groups[at].paths.push(path),
            None => {
                by_root.insert(root.clone(), groups.len());
                groups.push(PathGroup {
                    root,
                    paths: vec![path],
                });
            }
        }
    }
    groups
}
