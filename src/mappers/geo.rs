//! Geographic distance.

use crate::error::{Error, Result};
use crate::mappers::{column_pair, derive};
use crate::node::Mapper;
use crate::row::Row;
use crate::stream::RowStream;
use crate::value::Value;

/// Earth radius used by [`Haversine`], in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6373.0;

/// Great-circle distance in kilometres between two points.
///
/// Both columns hold `[longitude, latitude]` lists in degrees.
#[derive(Clone, Debug)]
pub struct Haversine {
    pub columns: [String; 2],
    pub result: String,
}

impl Haversine {
    pub fn new<S: AsRef<str>>(columns: &[S], result: impl Into<String>) -> Result<Self> {
        Ok(Self {
            columns: column_pair("haversine", columns)?,
            result: result.into(),
        })
    }
}

fn point(row: &Row, column: &str) -> Result<(f64, f64)> {
    match row.require_list(column)? {
        [lon, lat] => Ok((lon.to_radians(), lat.to_radians())),
        other => Err(Error::invalid_value(
            column,
            format!("expected [lon, lat], got {} coordinates", other.len()),
        )),
    }
}

/// Distance between two `(lon, lat)` points given in radians.
#[must_use]
pub fn haversine_km((lon1, lat1): (f64, f64), (lon2, lat2): (f64, f64)) -> f64 {
    let a = ((lat2 - lat1) / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * ((lon2 - lon1) / 2.0).sin().powi(2);
    2.0 * a.sqrt().asin() * EARTH_RADIUS_KM
}

impl Mapper for Haversine {
    fn apply(&self, row: Row) -> RowStream {
        let [start, end] = &self.columns;
        derive(row, &self.result, |r| {
            Ok(Value::Float(haversine_km(point(r, start)?, point(r, end)?)))
        })
    }

    fn name(&self) -> &'static str {
        "haversine"
    }
}
