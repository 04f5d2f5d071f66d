// tests/reducers.rs
use anyhow::Result;
use rowgraph::reducers::{Count, FirstReducer, Sum, TermFrequency, TopN};
use rowgraph::testing::*;
use rowgraph::*;

fn reduce(reducer: impl Reducer + 'static, keys: &[&str], rows: Vec<Row>) -> Result<Vec<Row>> {
    let graph = Graph::from_source("rows").reduce(reducer, keys);
    Ok(collect_rows(graph.run(&Bindings::new().bind_rows("rows", rows))?)?)
}

fn scores(values: &[i64]) -> Vec<Row> {
    values
        .iter()
        .enumerate()
        .map(|(i, s)| row! { "player" => i, "score" => *s })
        .collect()
}

fn score_column(rows: &[Row]) -> Vec<i64> {
    rows.iter().map(|r| r.require_f64("score").unwrap() as i64).collect()
}

#[test]
fn top_n_keeps_the_largest_descending() -> Result<()> {
    let out = reduce(TopN::new("score", 3), &[], scores(&[5, 1, 9, 3, 7]))?;
    assert_eq!(score_column(&out), vec![9, 7, 5]);
    // Rows come through untouched.
    assert_rows_equal(&out[..1], &[row! { "player" => 2_usize, "score" => 9 }]);
    Ok(())
}

#[test]
fn top_n_larger_than_group_returns_all_descending() -> Result<()> {
    let out = reduce(TopN::new("score", 10), &[], scores(&[5, 1, 9, 3, 7]))?;
    assert_eq!(score_column(&out), vec![9, 7, 5, 3, 1]);
    Ok(())
}

#[test]
fn top_n_with_an_unbounded_count_returns_all_descending() -> Result<()> {
    for n in [usize::MAX, 1 << 40] {
        let out = reduce(TopN::new("score", n), &[], scores(&[5, 1, 9, 3, 7]))?;
        assert_eq!(score_column(&out), vec![9, 7, 5, 3, 1], "n = {n}");
    }
    Ok(())
}

#[test]
fn top_n_ties_follow_encounter_order() -> Result<()> {
    let out = reduce(TopN::new("score", 2), &[], scores(&[4, 8, 4, 8, 8]))?;
    let players: Vec<i64> = out.iter().map(|r| r.require_f64("player").unwrap() as i64).collect();
    assert_eq!(players, vec![1, 3]);
    Ok(())
}

#[test]
fn top_n_runs_per_group() -> Result<()> {
    let rows = vec![
        row! { "g" => "a", "score" => 1 },
        row! { "g" => "a", "score" => 3 },
        row! { "g" => "b", "score" => 2 },
    ];
    let out = reduce(TopN::new("score", 1), &["g"], rows)?;
    assert_rows_equal(&out, &[row! { "g" => "a", "score" => 3 }, row! { "g" => "b", "score" => 2 }]);
    Ok(())
}

#[test]
fn count_emits_keys_and_count() -> Result<()> {
    let rows = vec![
        row! { "a" => 1, "b" => "x", "extra" => 0 },
        row! { "a" => 1, "b" => "x", "extra" => 1 },
        row! { "a" => 2, "b" => "x", "extra" => 2 },
    ];
    let out = reduce(Count::new("n"), &["a", "b"], rows)?;
    assert_rows_equal(
        &out,
        &[row! { "a" => 1, "b" => "x", "n" => 2 }, row! { "a" => 2, "b" => "x", "n" => 1 }],
    );
    Ok(())
}

#[test]
fn count_with_no_keys_counts_everything() -> Result<()> {
    let out = reduce(Count::new("n"), &[], scores(&[1, 2, 3]))?;
    assert_rows_equal(&out, &[row! { "n" => 3 }]);
    Ok(())
}

#[test]
fn sum_keeps_integers_integral() -> Result<()> {
    let rows = vec![row! { "k" => "a", "v" => 2, "c" => 4 }, row! { "k" => "a", "v" => 3, "c" => 5 }];
    let out = reduce(Sum::new("v"), &["k"], rows)?;
    assert_eq!(out, vec![row! { "k" => "a", "v" => 5 }]);
    assert_eq!(out[0].get("v"), Some(&Value::Int(5)));
    Ok(())
}

#[test]
fn sum_with_a_float_is_float() -> Result<()> {
    let rows = vec![row! { "v" => 1 }, row! { "v" => 0.5 }];
    let out = reduce(Sum::new("v"), &[], rows)?;
    assert_approx_eq!(out[0].require_f64("v")?, 1.5);
    assert!(matches!(out[0].get("v"), Some(Value::Float(_))));
    Ok(())
}

#[test]
fn sum_of_text_is_a_type_mismatch() {
    let rows = vec![row! { "v" => 1 }, row! { "v" => "two" }];
    let err = reduce(Sum::new("v"), &[], rows).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::TypeMismatch { expected: "number", found: "string", .. })
    ));
}

#[test]
fn term_frequency_per_document() -> Result<()> {
    let rows = vec![
        row! { "doc" => 1, "w" => "b" },
        row! { "doc" => 1, "w" => "a" },
        row! { "doc" => 1, "w" => "b" },
        row! { "doc" => 1, "w" => "b" },
        row! { "doc" => 2, "w" => "a" },
    ];
    let out = reduce(TermFrequency::new("w"), &["doc"], rows)?;
    assert_rows_equal(
        &out,
        &[
            row! { "doc" => 1, "w" => "b", "tf" => 0.75 },
            row! { "doc" => 1, "w" => "a", "tf" => 0.25 },
            row! { "doc" => 2, "w" => "a", "tf" => 1.0 },
        ],
    );
    Ok(())
}

#[test]
fn term_frequency_custom_result_column() -> Result<()> {
    let out = reduce(
        TermFrequency::with_result("w", "share"),
        &[],
        vec![row! { "w" => "x" }, row! { "w" => "y" }],
    )?;
    assert!(out.iter().all(|r| r.contains("share") && !r.contains("tf")));
    Ok(())
}

#[test]
fn first_reducer_keeps_the_first_row_of_each_run() -> Result<()> {
    let rows = vec![
        row! { "k" => 1, "v" => "first" },
        row! { "k" => 1, "v" => "second" },
        row! { "k" => 2, "v" => "only" },
    ];
    let out = reduce(FirstReducer, &["k"], rows)?;
    assert_rows_equal(&out, &[row! { "k" => 1, "v" => "first" }, row! { "k" => 2, "v" => "only" }]);
    Ok(())
}
