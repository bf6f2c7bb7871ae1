use serde_json::{Value, json};
use weft::extract::{Coordinates, ExtractedItem, extract};
use weft::path::PathExpr;

fn run<'v>(document: &'v Value, path: &str) -> Vec<ExtractedItem<'v>> {
    let path = PathExpr::parse(path);
    let mut items = Vec::new();
    extract(
        document,
        path.components(),
        &Coordinates::new(),
        path.key(),
        0,
        &mut items,
    );
    items
}

#[test]
fn literal_traversal_reaches_one_value() {
    let document = json!({ "a": { "b": { "c": 42 } } });
    let items = run(&document, "a.b.c");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].value, &json!(42));
    assert_eq!(items[0].key, "c");
    assert_eq!(items[0].coords.depth(), 0);
}

#[test]
fn absent_segment_yields_nothing() {
    let document = json!({ "a": { "b": { "c": 42 } } });
    assert!(run(&document, "a.b.missing").is_empty());
    assert!(run(&document, "a.x.c").is_empty());
    assert!(run(&document, "x.b.c").is_empty());
}

#[test]
fn named_wildcard_binds_source_index() {
    let document = json!({ "a": [ { "b": 1 }, { "b": 2 }, { "other": 3 } ] });
    let items = run(&document, "a.{i}.b");
    // one item per entry of a that actually has the field b
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].value, &json!(1));
    assert_eq!(items[0].coords.get("i"), Some(0));
    assert_eq!(items[1].value, &json!(2));
    assert_eq!(items[1].coords.get("i"), Some(1));
}

#[test]
fn alias_becomes_the_output_key() {
    let document = json!({ "a": [ { "b": 7 } ] });
    let items = run(&document, "a.{i}.b as beta");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].key, "beta");
}

#[test]
fn nested_wildcards_accumulate_coordinates() {
    let document = json!({
        "students": [
            { "scores": [ { "v": 90 }, { "v": 80 } ] },
            { "scores": [ { "v": 60 } ] }
        ]
    });
    let items = run(&document, "students.{i}.scores.{j}.v");
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].coords.get("i"), Some(0));
    assert_eq!(items[0].coords.get("j"), Some(0));
    assert_eq!(items[1].coords.get("i"), Some(0));
    assert_eq!(items[1].coords.get("j"), Some(1));
    assert_eq!(items[2].coords.get("i"), Some(1));
    assert_eq!(items[2].coords.get("j"), Some(0));
}

#[test]
fn prefixed_suffixed_wildcard_resolves_prefix_then_suffix() {
    // teams{t}name: look up "teams", iterate it, then continue into "name"
    let document = json!({ "teams": [ { "name": "x" }, { "name": "y" } ] });
    let items = run(&document, "teams{t}name");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].value, &json!("x"));
    assert_eq!(items[0].coords.get("t"), Some(0));
    assert_eq!(items[1].value, &json!("y"));
    assert_eq!(items[1].coords.get("t"), Some(1));
}

#[test]
fn prefixed_wildcard_without_suffix() {
    let document = json!({ "grid": { "rows": [ [1, 2], [3] ] } });
    let items = run(&document, "grid.rows{r}");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].value, &json!([1, 2]));
    assert_eq!(items[1].value, &json!([3]));
    assert_eq!(items[1].coords.get("r"), Some(1));
}

#[test]
fn bare_star_iterates_without_a_named_variable() {
    let document = json!({ "xs": [10, 20] });
    let items = run(&document, "xs.*");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].value, &json!(10));
    assert_eq!(items[1].value, &json!(20));
    // the synthesized variable still counts as one iteration dimension
    assert_eq!(items[0].coords.depth(), 1);
    assert_eq!(items[0].coords.get("i"), None);
}

#[test]
fn wildcard_over_non_sequence_prunes_silently() {
    let document = json!({ "a": 5, "b": { "c": 1 } });
    assert!(run(&document, "a.*").is_empty());
    assert!(run(&document, "b.{i}").is_empty());
    assert!(run(&document, "missing{m}").is_empty());
}

#[test]
fn exhausted_components_emit_the_whole_subtree() {
    let document = json!({ "a": [1, 2] });
    let items = run(&document, "a");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].value, &json!([1, 2]));
    assert_eq!(items[0].key, "a");
}
