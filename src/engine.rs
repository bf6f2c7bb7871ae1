//! The pipeline: filtering, sorting, and the engine that wires directive
//! handling, extraction, scope joining and dataset joining together, either
//! eagerly or behind a lazy iterator.

use std::cmp::Ordering;

use serde_json::Value;
use tracing::{debug, trace};

use crate::datatype::{Literal, Record, value_cmp};
use crate::error::Result;
use crate::extract::{Coordinates, extract, join_by_scope};
use crate::join::join_datasets;
use crate::path::{Directives, PathGroup, group_by_root, split_specs};

// ------------- Filtering -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
}

impl CmpOp {
    // longest tokens first, so ">=" is found before ">"
    const TOKENS: [(&'static str, CmpOp); 6] = [
        (">=", CmpOp::Ge),
        ("<=", CmpOp::Le),
        ("==", CmpOp::Eq),
        ("!=", CmpOp::Ne),
        (">", CmpOp::Gt),
        ("<", CmpOp::Lt),
    ];
    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            CmpOp::Gt => ordering == Ordering::Greater,
            CmpOp::Lt => ordering == Ordering::Less,
            CmpOp::Ge => ordering != Ordering::Less,
            CmpOp::Le => ordering != Ordering::Greater,
            CmpOp::Eq => ordering == Ordering::Equal,
            CmpOp::Ne => ordering != Ordering::Equal,
        }
    }
}

/// One parsed filter condition: `<field> <op> <literal>`.
#[derive(Debug, Clone)]
pub struct Condition {
    field: String,
    op: CmpOp,
    literal: Literal,
}

impl Condition {
    /// Recognize the first operator token in the expression, longest
    /// tokens first. `None` when no operator is present; such a condition
    /// is a no-op for the filter stage.
    pub fn parse(expr: &str) -> Option<Condition> {
        for (token, op) in CmpOp::TOKENS {
            if let Some(at) = expr.find(token) {
                return Some(Condition {
                    field: expr[..at].trim().to_string(),
                    op,
                    literal: Literal::parse(expr[at + token.len()..].trim()),
                });
            }
        }
        None
    }
    /// A row passes when it has the field and the comparison holds.
    /// An incomparable pair satisfies only `!=`.
    pub fn matches(&self, record: &Record) -> bool {
        let Some(value) = record.get(&self.field) else {
            return false;
        };
        match self.literal.compare(value) {
            Some(ordering) => self.op.accepts(ordering),
            None => self.op == CmpOp::Ne,
        }
    }
}

/// Apply each condition in turn, narrowing the surviving rows. Conditions
/// without a recognizable operator are skipped.
pub fn apply_filters(mut rows: Vec<Record>, conditions: &[String]) -> Vec<Record> {
    for raw in conditions {
        let Some(condition) = Condition::parse(raw) else {
            debug!(condition = %raw, "no comparison operator found, skipping filter condition");
            continue;
        };
        rows.retain(|row| condition.matches(row));
    }
    rows
}

// ------------- Sorting -------------
/// One parsed sort key: a field and a direction. Everything except a
/// trailing `DESC` (any case) means ascending.
#[derive(Debug, Clone)]
pub struct SortKey {
    field: String,
    ascending: bool,
}

impl SortKey {
    pub fn parse(expr: &str) -> SortKey {
        match expr.trim().rsplit_once(' ') {
            Some((field, direction)) => SortKey {
                field: field.trim().to_string(),
                ascending: !direction.trim().eq_ignore_ascii_case("DESC"),
            },
            None => SortKey {
                field: expr.trim().to_string(),
                ascending: true,
            },
        }
    }
}

/// Stable multi-key sort, first key primary: one stable sort per key,
/// applied right to left, so the leftmost key decides last. A missing
/// field sorts as null (below everything); ordering values of different
/// types is a [`crate::error::WeftError::Comparison`].
pub fn apply_sort(rows: &mut [Record], keys: &[SortKey]) -> Result<()> {
    for key in keys.iter().rev() {
        let mut failure = None;
        rows.sort_by(|a, b| {
            let left = a.get(&key.field).unwrap_or(&Value::Null);
            let right = b.get(&key.field).unwrap_or(&Value::Null);
            match value_cmp(left, right) {
                Ok(ordering) => {
                    if key.ascending {
                        ordering
                    } else {
                        ordering.reverse()
                    }
                }
                Err(error) => {
                    failure.get_or_insert(error);
                    Ordering::Equal
                }
            }
        });
        if let Some(error) = failure {
            return Err(error);
        }
    }
    Ok(())
}

// ------------- Engine -------------
/// The query engine. Borrows a caller-owned document for the duration of
/// the run; the borrow also keeps the document immutable while a lazy
/// [`Rows`] is being consumed.
pub struct Engine<'a> {
    document: &'a Value,
}

impl<'a> Engine<'a> {
    pub fn new(document: &'a Value) -> Self {
        Self { document }
    }

    /// Run the pipeline and materialize every row.
    pub fn execute<S: AsRef<str>>(&self, specs: &[S]) -> Result<Vec<Record>> {
        let (paths, directives) = split_specs(specs);
        run_pipeline(self.document, group_by_root(paths), &directives)
    }

    /// Run the pipeline lazily. Nothing is evaluated until the returned
    /// iterator is first polled; plans without join and sort stages then
    /// stream one path group at a time, while plans with either stage
    /// buffer their full result on the first poll (both need complete
    /// input before the first row can be emitted).
    pub fn rows<S: AsRef<str>>(&self, specs: &[S]) -> Rows<'a> {
        let (paths, directives) = split_specs(specs);
        Rows {
            state: State::Pending {
                document: self.document,
                groups: group_by_root(paths),
                directives,
            },
        }
    }
}

/// Extract every path of one group against the document and scope-join the
/// items into the group's dataset.
fn collect_group(document: &Value, group: &PathGroup) -> Vec<Record> {
    let mut items = Vec::new();
    for (ordinal, path) in group.paths.iter().enumerate() {
        extract(
            document,
            path.components(),
            &Coordinates::new(),
            path.key(),
            ordinal,
            &mut items,
        );
    }
    trace!(root = %group.root, items = items.len(), "extracted path group");
    join_by_scope(items)
}

fn run_pipeline(
    document: &Value,
    groups: Vec<PathGroup>,
    directives: &Directives,
) -> Result<Vec<Record>> {
    debug!(groups = groups.len(), "running pipeline");
    let datasets: Vec<Vec<Record>> = groups
        .iter()
        .map(|group| collect_group(document, group))
        .collect();
    let mut rows = if directives.join_by.is_empty() {
        datasets.into_iter().flatten().collect()
    } else {
        join_datasets(datasets, &directives.join_by)
    };
    rows = apply_filters(rows, &directives.filter_by);
    if !directives.sort_by.is_empty() {
        let keys: Vec<SortKey> = directives
            .sort_by
            .iter()
            .map(|raw| SortKey::parse(raw))
            .collect();
        apply_sort(&mut rows, &keys)?;
    }
    Ok(rows)
}

// ------------- Lazy rows -------------
/// A single-pass, forward-only producer of records. Obtained from
/// [`Engine::rows`]; dropping it abandons the run, no cleanup needed.
/// A sort-stage comparison failure surfaces as one `Err` item, after which
/// the iterator is exhausted.
pub struct Rows<'a> {
    state: State<'a>,
}

enum State<'a> {
    Pending {
        document: &'a Value,
        groups: Vec<PathGroup>,
        directives: Directives,
    },
    Streaming {
        document: &'a Value,
        groups: std::vec::IntoIter<PathGroup>,
        conditions: Vec<Condition>,
        current: std::vec::IntoIter<Record>,
    },
    Buffered(std::vec::IntoIter<Record>),
    Done,
}

impl Iterator for Rows<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.state, State::Done) {
                State::Pending {
                    document,
                    groups,
                    directives,
                } => {
                    if directives.join_by.is_empty() && directives.sort_by.is_empty() {
                        let conditions = directives
                            .filter_by
                            .iter()
                            .filter_map(|raw| {
                                let parsed = Condition::parse(raw);
                                if parsed.is_none() {
                                    debug!(condition = %raw, "no comparison operator found, skipping filter condition");
                                }
                                parsed
                            })
                            .collect();
                        self.state = State::Streaming {
                            document,
                            groups: groups.into_iter(),
                            conditions,
                            current: Vec::new().into_iter(),
                        };
                    } else {
                        // join and sort need complete input, so the whole
                        // pipeline materializes on the first poll
                        match run_pipeline(document, groups, &directives) {
                            Ok(rows) => self.state = State::Buffered(rows.into_iter()),
                            Err(error) => return Some(Err(error)),
                        }
                    }
                }
                State::Streaming {
                    document,
                    mut groups,
                    conditions,
                    mut current,
                } => {
                    if let Some(row) = current.next() {
                        let keep = conditions.iter().all(|condition| condition.matches(&row));
                        self.state = State::Streaming {
                            document,
                            groups,
                            conditions,
                            current,
                        };
                        if keep {
                            return Some(Ok(row));
                        }
                        continue;
                    }
                    match groups.next() {
                        Some(group) => {
                            let dataset = collect_group(document, &group);
                            self.state = State::Streaming {
                                document,
                                groups,
                                conditions,
                                current: dataset.into_iter(),
                            };
                        }
                        None => return None,
                    }
                }
                State::Buffered(mut rows) => match rows.next() {
                    Some(row) => {
                        self.state = State::Buffered(rows);
                        return Some(Ok(row));
                    }
                    None => return None,
                },
                State::Done => return None,
            }
        }
    }
}
