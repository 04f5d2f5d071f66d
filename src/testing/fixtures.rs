//! Small datasets for pipeline tests.

use crate::row;
use crate::row::Row;

/// Six short documents (`doc_id`, `text`) with mixed case and punctuation.
#[must_use]
pub fn text_corpus() -> Vec<Row> {
    [
        (1, "hello, little world"),
        (2, "little"),
        (3, "little little little"),
        (4, "little? hello little world"),
        (5, "HELLO HELLO! WORLD..."),
        (6, "world? world... world!!! WORLD!!! HELLO!!!"),
    ]
    .into_iter()
    .map(|(doc_id, text)| row! { "doc_id" => doc_id, "text" => text })
    .collect()
}

/// Road segments with `[lon, lat]` endpoints.
#[must_use]
pub fn road_lengths() -> Vec<Row> {
    vec![
        row! {
            "start" => [37.84870228730142, 55.73853974696249],
            "end" => [37.8490418381989, 55.73832445777953],
            "edge_id" => 8_414_926_848_168_493_057_i64,
        },
        row! {
            "start" => [37.524768467992544, 55.88785375468433],
            "end" => [37.52415172755718, 55.88807155843824],
            "edge_id" => 5_342_768_494_149_337_085_i64,
        },
    ]
}

/// Trips over the segments of [`road_lengths`], in the `%Y%m%dT%H%M%S%.f` layout.
#[must_use]
pub fn travel_times() -> Vec<Row> {
    vec![
        row! {
            "leave_time" => "20171020T112238.723000",
            "enter_time" => "20171020T112237.427000",
            "edge_id" => 8_414_926_848_168_493_057_i64,
        },
        row! {
            "leave_time" => "20171011T145553.040000",
            "enter_time" => "20171011T145551.957000",
            "edge_id" => 8_414_926_848_168_493_057_i64,
        },
        row! {
            "leave_time" => "20171020T090548.939000",
            "enter_time" => "20171020T090547.463000",
            "edge_id" => 5_342_768_494_149_337_085_i64,
        },
        row! {
            "leave_time" => "20171024T144101.879000",
            "enter_time" => "20171024T144059.102000",
            "edge_id" => 5_342_768_494_149_337_085_i64,
        },
    ]
}
