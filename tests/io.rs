// tests/io.rs
use anyhow::Result;
use rowgraph::io::jsonl;
use rowgraph::testing::*;
use rowgraph::*;
use std::fs;
use std::sync::Arc;

#[test]
fn jsonl_file_feeds_a_graph() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("rows.jsonl");
    fs::write(&path, "{\"k\": 2, \"v\": \"b\"}\n\n{\"k\": 1, \"v\": \"a\"}\n")?;

    let out = collect_rows(Graph::from_jsonl(&path).sort(&["k"]).run(&Bindings::new())?)?;
    assert_rows_equal(
        &out,
        &[row! { "k" => 1, "v" => "a" }, row! { "k" => 2, "v" => "b" }],
    );
    Ok(())
}

#[test]
fn written_files_read_back_in_order() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let rows = vec![
        row! { "id" => 1, "at" => vec![37.5, 55.8] },
        row! { "id" => 2, "name" => "x", "score" => 0.5 },
    ];
    for name in ["plain.jsonl", "nested/packed.jsonl.gz", "packed.jsonl.zst"] {
        let path = dir.path().join(name);
        let written = jsonl::write_file(&path, rows.clone().into_iter().map(Ok))?;
        assert_eq!(written, 2);
        let back = collect_rows(Graph::from_jsonl(&path).run(&Bindings::new())?)?;
        assert_rows_equal(&back, &rows);
    }
    Ok(())
}

#[test]
fn malformed_line_reports_its_number() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("bad.jsonl");
    fs::write(&path, "{\"a\": 1}\n{\"a\": 2}\nnot json\n{\"a\": 4}\n")?;

    let mut stream = Graph::from_jsonl(&path).run(&Bindings::new())?;
    assert!(stream.next().unwrap().is_ok());
    assert!(stream.next().unwrap().is_ok());
    let err = stream.next().unwrap().unwrap_err();
    assert!(matches!(err, Error::MalformedInput { line: 3, .. }), "{err}");
    assert!(stream.next().is_none());
    Ok(())
}

#[test]
fn integers_beyond_i64_are_rejected_not_rounded() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("ids.jsonl");
    fs::write(
        &path,
        "{\"id\": 9223372036854775807}\n{\"id\": 18446744073709551614}\n",
    )?;

    let items: Vec<_> = Graph::from_jsonl(&path).run(&Bindings::new())?.collect();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().ok(), Some(&row! { "id" => i64::MAX }));
    assert!(matches!(items[1], Err(Error::MalformedInput { line: 2, .. })));
    Ok(())
}

#[test]
fn missing_file_fails_on_first_pull() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("absent.jsonl");
    let graph = Graph::from_jsonl(&path);

    // Building and starting the run does not touch the file.
    let mut stream = graph.run(&Bindings::new())?;
    match stream.next() {
        Some(Err(Error::Io { path: reported, .. })) => assert_eq!(reported, path),
        other => panic!("expected an I/O error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn custom_line_parser() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("words.txt");
    fs::write(&path, "beta\nalpha\n")?;

    let parser: LineParser =
        Arc::new(|line: &str| -> std::result::Result<Row, String> { Ok(row! { "word" => line.trim() }) });
    let out = collect_rows(Graph::from_file(&path, parser).sort(&["word"]).run(&Bindings::new())?)?;
    assert_rows_equal(&out, &[row! { "word" => "alpha" }, row! { "word" => "beta" }]);
    Ok(())
}

#[test]
fn write_rows_stops_at_first_error() {
    let rows = vec![
        Ok(row! { "a" => 1 }),
        Err(Error::InvalidConfiguration("boom".into())),
        Ok(row! { "a" => 3 }),
    ];
    let mut buf = Vec::new();
    let result = jsonl::write_rows(&mut buf, rows, std::path::Path::new("<memory>"));
    assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    assert_eq!(String::from_utf8(buf).unwrap(), "{\"a\":1}\n");
}
