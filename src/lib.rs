//! Weft – declarative extraction and weaving of nested JSON-like trees.
//!
//! Weft answers one question: given a deeply nested document, how do you
//! pull values from several of its branches and get flat, coherent rows
//! back without writing traversal code? The caller describes *where* values
//! live as a flat list of dotted path expressions; the engine does the
//! walking, the correlating and the reshaping:
//! * A path component is a literal field name, a wildcard (`*`), a named
//!   wildcard (`{i}`, which binds the sequence index it matched), or a
//!   literal-prefixed/suffixed wildcard (`rows{r}cells`).
//! * While a path fans out over nested sequences, the engine tracks the
//!   index taken at each wildcard — the match's *coordinates*.
//! * Values extracted by different paths are woven into one record when
//!   their coordinates agree on every wildcard variable they share.
//!
//! ## Modules
//! * [`engine`] – The [`engine::Engine`] pipeline: directive handling,
//!   per-group extraction, dataset joining, filtering and sorting, eager or
//!   lazy.
//! * [`path`] – Path expression parsing, reserved directive splitting, and
//!   grouping of paths by their shared literal root.
//! * [`extract`] – The recursive wildcard extractor and the scope joiner
//!   that assembles one group's items into records.
//! * [`join`] – The full outer join across per-group datasets.
//! * [`datatype`] – Records, value ordering, filter literals and join keys.
//! * [`error`] – The [`error::WeftError`] enum and crate `Result` alias.
//!
//! ## Directives
//! Alongside data paths the spec list may carry reserved directives, each
//! with a bracketed argument list:
//! * `join_by: [id]` – full outer join of the per-group datasets on the
//!   named fields.
//! * `filter_by: [score > 80, name == Alice]` – conjunction of comparison
//!   predicates.
//! * `sort_by: [score DESC, name ASC]` – stable multi-key sort.
//! * `group_by: [...]` – parsed and accepted, reserved for future use.
//!
//! ## Quick Start
//! ```
//! use serde_json::json;
//! use weft::engine::Engine;
//!
//! let document = json!({
//!     "students": [
//!         { "name": "A", "scores": [ { "v": 90 } ] },
//!         { "name": "B", "scores": [ { "v": 60 } ] }
//!     ]
//! });
//! let engine = Engine::new(&document);
//! let rows = engine.execute(&[
//!     "students.{i}.name",
//!     "students.{i}.scores.{j}.v as score",
//!     "filter_by: [score >= 70]",
//! ]).unwrap();
//! assert_eq!(rows.len(), 1);
//! assert_eq!(rows[0]["name"], json!("A"));
//! assert_eq!(rows[0]["score"], json!(90));
//! ```
//!
//! ## Shape of a run
//! Directive splitting runs first, then paths are grouped by literal root;
//! each group is extracted and scope-joined into one dataset. With a
//! `join_by` directive the datasets meet in a full outer join (output key
//! order unspecified), otherwise they concatenate in group order. Filtering
//! and sorting close the pipeline. [`engine::Engine::execute`] materializes
//! the rows; [`engine::Engine::rows`] returns a one-shot lazy iterator
//! instead.
//!
//! ## Mismatches and errors
//! Structural mismatches — a missing field, a scalar where a wildcard
//! expected a sequence — silently prune that branch; sparse and
//! heterogeneous documents are queried without per-record guards. Malformed
//! directive arguments are ignored. The one runtime error the pipeline can
//! produce is [`error::WeftError::Comparison`], when sorting is asked to
//! order values of incompatible types.

pub mod datatype;
pub mod engine;
pub mod error;
pub mod extract;
pub mod join;
pub mod path;
