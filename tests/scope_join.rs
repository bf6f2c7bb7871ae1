use serde_json::{Value, json};
use weft::engine::Engine;

fn rows(document: &Value, specs: &[&str]) -> Vec<Value> {
    Engine::new(document)
        .execute(specs)
        .expect("query ok")
        .into_iter()
        .map(Value::Object)
        .collect()
}

#[test]
fn single_path_yields_one_record_per_item() {
    let document = json!({ "a": [ { "b": 1 }, { "b": 2 } ] });
    let result = rows(&document, &["a.{i}.b"]);
    assert_eq!(result, vec![json!({ "b": 1 }), json!({ "b": 2 })]);
}

#[test]
fn sibling_paths_weave_by_shared_coordinates() {
    let document = json!({
        "students": [
            { "name": "A", "scores": [ { "v": 90 } ] },
            { "name": "B", "scores": [ { "v": 60 } ] }
        ]
    });
    let result = rows(
        &document,
        &["students.{i}.name", "students.{i}.scores.{j}.v as score"],
    );
    assert_eq!(
        result,
        vec![
            json!({ "name": "A", "score": 90 }),
            json!({ "name": "B", "score": 60 })
        ]
    );
}

#[test]
fn deepest_path_defines_record_identity() {
    let document = json!({
        "students": [
            { "name": "A", "scores": [ { "v": 90 }, { "v": 80 } ] },
            { "name": "B", "scores": [ { "v": 60 } ] }
        ]
    });
    let result = rows(
        &document,
        &["students.{i}.name", "students.{i}.scores.{j}.v as score"],
    );
    // one record per score, the shallower name repeated within its scope
    assert_eq!(
        result,
        vec![
            json!({ "name": "A", "score": 90 }),
            json!({ "name": "A", "score": 80 }),
            json!({ "name": "B", "score": 60 })
        ]
    );
}

#[test]
fn wildcard_free_path_attaches_to_every_record() {
    let document = json!({ "items": [ { "x": 1 }, { "x": 2 } ] });
    let result = rows(&document, &["items.{i}.x", "items as all"]);
    let everything = json!([ { "x": 1 }, { "x": 2 } ]);
    assert_eq!(
        result,
        vec![
            json!({ "x": 1, "all": everything }),
            json!({ "x": 2, "all": everything })
        ]
    );
}

#[test]
fn anonymous_wildcards_do_not_pair_across_paths() {
    let document = json!({ "pairs": [ { "a": 1, "b": 2 }, { "a": 3, "b": 4 } ] });
    let result = rows(&document, &["pairs.*.a", "pairs.*.b"]);
    // the two paths share no named variable, so every base record picks up
    // the first extracted b rather than the positionally matching one
    assert_eq!(
        result,
        vec![json!({ "a": 1, "b": 2 }), json!({ "a": 3, "b": 2 })]
    );
}

#[test]
fn named_wildcards_do_pair_across_paths() {
    let document = json!({ "pairs": [ { "a": 1, "b": 2 }, { "a": 3, "b": 4 } ] });
    let result = rows(&document, &["pairs.{p}.a", "pairs.{p}.b"]);
    assert_eq!(
        result,
        vec![json!({ "a": 1, "b": 2 }), json!({ "a": 3, "b": 4 })]
    );
}

#[test]
fn groups_with_different_roots_concatenate() {
    let document = json!({ "a": [ { "x": 1 } ], "b": [ { "y": 2 } ] });
    let result = rows(&document, &["a.{i}.x", "b.{j}.y"]);
    assert_eq!(result, vec![json!({ "x": 1 }), json!({ "y": 2 })]);
}

#[test]
fn first_eligible_item_wins_ties() {
    let document = json!({
        "s": [ { "tags": ["t1", "t2"], "alts": ["a1", "a2"] } ]
    });
    let result = rows(&document, &["s.{i}.tags.{j} as tag", "s.{i}.alts.{k} as alt"]);
    // both alts agree with every tag on the shared variable i; the first
    // extracted one attaches to each record
    assert_eq!(
        result,
        vec![
            json!({ "tag": "t1", "alt": "a1" }),
            json!({ "tag": "t2", "alt": "a1" })
        ]
    );
}

#[test]
fn empty_extraction_yields_no_records() {
    let document = json!({ "a": [ { "b": 1 } ] });
    assert!(rows(&document, &["missing.{i}.x"]).is_empty());
}
