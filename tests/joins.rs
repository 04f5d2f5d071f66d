// tests/joins.rs
use anyhow::Result;
use rowgraph::testing::*;
use rowgraph::*;

fn users() -> Vec<Row> {
    vec![
        row! { "id" => 1, "name" => "ann" },
        row! { "id" => 2, "name" => "bob" },
        row! { "id" => 2, "name" => "bea" },
        row! { "id" => 4, "name" => "dan" },
    ]
}

fn orders() -> Vec<Row> {
    vec![
        row! { "id" => 0, "item" => "pen" },
        row! { "id" => 2, "item" => "cup" },
        row! { "id" => 2, "item" => "hat" },
        row! { "id" => 2, "item" => "mug" },
        row! { "id" => 4, "item" => "map" },
        row! { "id" => 5, "item" => "ink" },
    ]
}

fn join_with(joiner: impl Joiner + 'static) -> Result<Vec<Row>> {
    let left = Graph::from_source("users").sort(&["id"]);
    let right = Graph::from_source("orders").sort(&["id"]);
    let graph = left.join(joiner, &right, &["id"]);
    let bindings = Bindings::new()
        .bind_rows("users", users())
        .bind_rows("orders", orders());
    Ok(collect_rows(graph.run(&bindings)?)?)
}

// Matching keys: id 2 (2 x 3) and id 4 (1 x 1). Unmatched: left id 1, right ids 0 and 5.
const INNER: usize = 2 * 3 + 1;

#[test]
fn inner_counts_only_matching_pairs() -> Result<()> {
    let out = join_with(InnerJoiner::new())?;
    assert_eq!(out.len(), INNER);
    assert!(out.iter().all(|r| r.contains("name") && r.contains("item")));
    Ok(())
}

#[test]
fn left_adds_unmatched_left_rows_unchanged() -> Result<()> {
    let out = join_with(LeftJoiner::new())?;
    assert_eq!(out.len(), INNER + 1);
    assert_rows_equal(&out[..1], &[row! { "id" => 1, "name" => "ann" }]);
    Ok(())
}

#[test]
fn right_adds_unmatched_right_rows_unchanged() -> Result<()> {
    let out = join_with(RightJoiner::new())?;
    assert_eq!(out.len(), INNER + 2);
    assert_rows_equal(&out[..1], &[row! { "id" => 0, "item" => "pen" }]);
    assert_rows_equal(&out[out.len() - 1..], &[row! { "id" => 5, "item" => "ink" }]);
    Ok(())
}

#[test]
fn outer_keeps_everything_in_key_order() -> Result<()> {
    let out = join_with(OuterJoiner::new())?;
    assert_eq!(out.len(), INNER + 1 + 2);
    let ids: Vec<i64> = out.iter().map(|r| r.require_f64("id").unwrap() as i64).collect();
    assert_eq!(ids, vec![0, 1, 2, 2, 2, 2, 2, 2, 4, 5]);
    Ok(())
}

#[test]
fn pairs_follow_left_then_right_order() -> Result<()> {
    let out = join_with(InnerJoiner::new())?;
    let pairs: Vec<(String, String)> = out
        .iter()
        .map(|r| (r.require_str("name").unwrap().into(), r.require_str("item").unwrap().into()))
        .collect();
    let expected = [
        ("bob", "cup"), ("bob", "hat"), ("bob", "mug"),
        ("bea", "cup"), ("bea", "hat"), ("bea", "mug"),
        ("dan", "map"),
    ];
    let expected: Vec<(String, String)> = expected.iter().map(|(a, b)| ((*a).into(), (*b).into())).collect();
    assert_eq!(pairs, expected);
    Ok(())
}

#[test]
fn colliding_columns_get_suffixes() -> Result<()> {
    let left = vec![row! { "k" => 1, "x" => "l", "only_left" => true }];
    let right = vec![row! { "k" => 1, "x" => "r", "only_right" => false }];
    let out = collect_rows(cross_join(&["k".to_string()], left, right, &Suffixes::default()))?;
    assert_rows_equal(
        &out,
        &[row! { "k" => 1, "x_1" => "l", "x_2" => "r", "only_left" => true, "only_right" => false }],
    );
    assert!(!out[0].contains("x"));
    Ok(())
}

#[test]
fn custom_suffixes() -> Result<()> {
    let left = Graph::from_source("l");
    let right = Graph::from_source("r");
    let graph = left.join(InnerJoiner::with_suffixes("_left", "_right"), &right, &["k"]);
    let bindings = Bindings::new()
        .bind_rows("l", vec![row! { "k" => 1, "v" => 10 }])
        .bind_rows("r", vec![row! { "k" => 1, "v" => 20 }]);
    let out = collect_rows(graph.run(&bindings)?)?;
    assert_rows_equal(&out, &[row! { "k" => 1, "v_left" => 10, "v_right" => 20 }]);
    Ok(())
}

#[test]
fn empty_key_joins_every_pair() -> Result<()> {
    let left = Graph::from_source("l");
    let right = Graph::from_source("r");
    let bindings = Bindings::new()
        .bind_rows("l", (0..3).map(|i| row! { "a" => i }).collect())
        .bind_rows("r", (0..5).map(|i| row! { "b" => i }).collect());
    let out = collect_rows(left.join(InnerJoiner::new(), &right, &[]).run(&bindings)?)?;
    assert_eq!(out.len(), 15);
    Ok(())
}

#[test]
fn empty_side_passes_the_other_through() -> Result<()> {
    let left = Graph::from_source("l");
    let right = Graph::from_source("r");
    let bindings = Bindings::new()
        .bind_rows("l", vec![row! { "k" => 1 }, row! { "k" => 2 }])
        .bind_rows("r", vec![]);
    let inner = collect_rows(left.join(InnerJoiner::new(), &right, &["k"]).run(&bindings)?)?;
    let outer = collect_rows(left.join(OuterJoiner::new(), &right, &["k"]).run(&bindings)?)?;
    assert!(inner.is_empty());
    assert_rows_equal(&outer, &[row! { "k" => 1 }, row! { "k" => 2 }]);
    Ok(())
}

#[test]
fn int_and_float_keys_match() -> Result<()> {
    let left = Graph::from_source("l");
    let right = Graph::from_source("r");
    let bindings = Bindings::new()
        .bind_rows("l", vec![row! { "k" => 2, "a" => 1 }])
        .bind_rows("r", vec![row! { "k" => 2.0, "b" => 1 }]);
    let out = collect_rows(left.join(InnerJoiner::new(), &right, &["k"]).run(&bindings)?)?;
    assert_eq!(out.len(), 1);
    Ok(())
}
