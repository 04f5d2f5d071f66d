//! Ready-made analytics graphs built from the public API.
//!
//! Each function only composes graph nodes; nothing here reaches into the engine. Column
//! names come from a per-pipeline config struct whose `Default` matches the usual layout
//! of the input rows.

use crate::error::Result;
use crate::graph::Graph;
use crate::joins::InnerJoiner;
use crate::mappers::{
    Divide, Filter, FilterPunctuation, FractionLog, HoursBetween, Haversine, LowerCase, Product,
    Project, Rename, Split, Strftime, Strptime,
};
use crate::reducers::{Count, FirstReducer, Sum, TermFrequency, TopN};
use crate::row::Row;
use std::path::PathBuf;

/// Where a pipeline reads its rows from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    /// A binding supplied at run time.
    Source(String),
    /// A JSON-lines file, optionally compressed.
    Jsonl(PathBuf),
}

impl Input {
    #[must_use]
    pub fn source(name: impl Into<String>) -> Self {
        Input::Source(name.into())
    }

    #[must_use]
    pub fn jsonl(path: impl Into<PathBuf>) -> Self {
        Input::Jsonl(path.into())
    }

    /// A fresh source node for this input.
    #[must_use]
    pub fn graph(&self) -> Graph {
        match self {
            Input::Source(name) => Graph::from_source(name.clone()),
            Input::Jsonl(path) => Graph::from_jsonl(path.clone()),
        }
    }
}

/// Strip punctuation, lower-case, and emit one row per word of `text`.
fn words(input: &Input, text: &str) -> Graph {
    input
        .graph()
        .map(FilterPunctuation::new(text))
        .map(LowerCase::new(text))
        .map(Split::new(text))
}

#[derive(Clone, Debug)]
pub struct WordCountColumns {
    pub text: String,
    pub count: String,
}

impl Default for WordCountColumns {
    fn default() -> Self {
        Self {
            text: "text".into(),
            count: "count".into(),
        }
    }
}

/// Occurrences of every word across all rows, least frequent first, ties by word.
///
/// Output rows: `{text, count}`.
#[must_use]
pub fn word_count(input: &Input, columns: &WordCountColumns) -> Graph {
    let text = columns.text.as_str();
    let count = columns.count.as_str();
    words(input, text)
        .sort(&[text])
        .reduce(Count::new(count), &[text])
        .sort(&[count, text])
}

#[derive(Clone, Debug)]
pub struct InvertedIndexColumns {
    pub doc: String,
    pub text: String,
    pub result: String,
}

impl Default for InvertedIndexColumns {
    fn default() -> Self {
        Self {
            doc: "doc_id".into(),
            text: "text".into(),
            result: "tf_idf".into(),
        }
    }
}

/// TF-IDF of every (word, document) pair, keeping the three best documents per word.
///
/// `idf = ln(documents / documents containing the word)`, `tf` is the word's share of
/// the document. Output rows: `{doc, text, result}`, grouped by word.
pub fn inverted_index(input: &Input, columns: &InvertedIndexColumns) -> Result<Graph> {
    let (doc, text, result) = (columns.doc.as_str(), columns.text.as_str(), columns.result.as_str());

    let documents = input.graph().reduce(Count::new("docs_count"), &[]);
    let words = words(input, text);

    let idf = words
        .sort(&[doc, text])
        .reduce(FirstReducer, &[doc, text])
        .sort(&[text])
        .reduce(Count::new("docs_for_word"), &[text])
        .join(InnerJoiner::new(), &documents, &[])
        .map(FractionLog::new(&["docs_count", "docs_for_word"], "idf")?);

    Ok(words
        .sort(&[doc])
        .reduce(TermFrequency::new(text), &[doc])
        .sort(&[text])
        .join(InnerJoiner::new(), &idf, &[text])
        .map(Product::new(["tf", "idf"], result))
        .reduce(TopN::new(result, 3), &[text])
        .map(Project::new([doc, text, result])))
}

#[derive(Clone, Debug)]
pub struct PmiConfig {
    pub doc: String,
    pub text: String,
    pub result: String,
    /// Words kept per document.
    pub top_words: usize,
    /// Words must be strictly longer than this many characters.
    pub min_len: usize,
    /// Words must occur at least this many times in a document.
    pub min_occur: i64,
}

impl Default for PmiConfig {
    fn default() -> Self {
        Self {
            doc: "doc_id".into(),
            text: "text".into(),
            result: "pmi".into(),
            top_words: 10,
            min_len: 4,
            min_occur: 2,
        }
    }
}

/// The most characteristic words of each document by pointwise mutual information.
///
/// For word `w` in document `d`:
/// `pmi = ln((count(w, d) * total) / (count(d) * count(w)))`, counted over the words that
/// pass the length and occurrence filters. Output rows: `{doc, text, result}`, best first
/// within each document.
pub fn pmi(input: &Input, config: &PmiConfig) -> Result<Graph> {
    let (doc, text, result) = (config.doc.as_str(), config.text.as_str(), config.result.as_str());
    let (min_len, min_occur) = (config.min_len, config.min_occur);
    let text_column = config.text.clone();

    let counted = words(input, text)
        .map(Filter::new(move |r: &Row| {
            Ok(r.require_str(&text_column)?.chars().count() > min_len)
        }))
        .sort(&[doc, text])
        .reduce(Count::new("words_doc"), &[doc, text])
        .map(Filter::new(move |r: &Row| {
            Ok(r.require_f64("words_doc")? >= min_occur as f64)
        }));

    let per_word = counted
        .sort(&[text])
        .reduce(Sum::new("words_doc"), &[text])
        .map(Rename::new("words_doc", "word_i"));
    let per_doc = counted
        .sort(&[doc])
        .reduce(Sum::new("words_doc"), &[doc])
        .map(Rename::new("words_doc", "doc_j"));
    let total = counted
        .reduce(Sum::new("words_doc"), &[])
        .map(Rename::new("words_doc", "total"));

    let scored = counted
        .sort(&[text])
        .join(InnerJoiner::new(), &per_word, &[text])
        .join(InnerJoiner::new(), &total, &[])
        .sort(&[doc])
        .join(InnerJoiner::new(), &per_doc, &[doc])
        .map(Product::new(["words_doc", "total"], "total_words_doc"))
        .map(Product::new(["doc_j", "word_i"], "doc_j_word_i"))
        .map(FractionLog::new(&["total_words_doc", "doc_j_word_i"], result)?);

    Ok(scored
        .sort(&[doc, result])
        .reduce(TopN::new(result, config.top_words), &[doc])
        .map(Project::new([doc, text, result])))
}

/// Timestamp layout of the travel-time rows, e.g. `20171020T112238.723000`.
pub const ROAD_TIME_FORMAT: &str = "%Y%m%dT%H%M%S%.f";

#[derive(Clone, Debug)]
pub struct RoadSpeedConfig {
    pub enter_time: String,
    pub leave_time: String,
    pub edge_id: String,
    pub start: String,
    pub end: String,
    pub weekday: String,
    pub hour: String,
    pub speed: String,
    pub time_format: String,
}

impl Default for RoadSpeedConfig {
    fn default() -> Self {
        Self {
            enter_time: "enter_time".into(),
            leave_time: "leave_time".into(),
            edge_id: "edge_id".into(),
            start: "start".into(),
            end: "end".into(),
            weekday: "weekday".into(),
            hour: "hour".into(),
            speed: "speed".into(),
            time_format: ROAD_TIME_FORMAT.into(),
        }
    }
}

/// Average speed in km/h per weekday and hour of day.
///
/// `times` holds one row per trip over an edge (`edge_id`, enter and leave timestamps);
/// `lengths` holds one row per edge with its `[lon, lat]` endpoints. The speed for a slot
/// is the total distance travelled divided by the total hours spent, over the trips that
/// entered their edge in that slot. Output rows: `{weekday, hour, speed}` ordered by
/// weekday name and hour.
pub fn road_speed(times: &Input, lengths: &Input, config: &RoadSpeedConfig) -> Result<Graph> {
    let c = config;
    let (edge, weekday, hour) = (c.edge_id.as_str(), c.weekday.as_str(), c.hour.as_str());
    let slot = [weekday, hour];

    let with_slot = |graph: Graph| -> Result<Graph> {
        Ok(graph
            .map(Strptime::new(&c.enter_time, &c.time_format, "enter_date")?)
            .map(Strftime::new("enter_date", "%a", weekday)?)
            .map(Strftime::new("enter_date", "%H", hour)?.numeric()))
    };

    let edge_lengths = lengths
        .graph()
        .map(Haversine::new(&[&c.start, &c.end], "length")?)
        .sort(&[edge]);

    let hours = with_slot(times.graph())?
        .map(Strptime::new(&c.leave_time, &c.time_format, "leave_date")?)
        .map(HoursBetween::new(&["enter_date", "leave_date"], "time")?)
        .map(Project::new([weekday, hour, "time"]))
        .sort(&slot)
        .reduce(Sum::new("time"), &slot);

    let distance = with_slot(times.graph())?
        .map(Project::new([weekday, hour, edge]))
        .sort(&[edge])
        .join(InnerJoiner::new(), &edge_lengths, &[edge])
        .sort(&slot)
        .reduce(Sum::new("length"), &slot);

    Ok(distance
        .join(InnerJoiner::new(), &hours, &slot)
        .map(Divide::new(&["length", "time"], &c.speed)?)
        .map(Project::new([weekday, hour, c.speed.as_str()])))
}
