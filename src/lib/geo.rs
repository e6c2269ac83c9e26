use geo::prelude::*;
use geo::COORD_PRECISION;
use geo_types::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::Error;

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn new(lat: f64, lon: f64) -> Self {
        Location { lat, lon }
    }

    /// Great-circle distance in meters.
    pub fn distance(&self, other: &Location) -> f64 {
        let self_point: Point<f64> = (*self).into();
        let other_point: Point<f64> = (*other).into();
        self_point.haversine_distance(&other_point)
    }
}

impl PartialEq<Location> for Location {
    fn eq(&self, other: &Self) -> bool {
        self.distance(other) < COORD_PRECISION.into()
    }
}

impl From<Location> for Point<f64> {
    fn from(loc: Location) -> Self {
        Point::new(loc.lon, loc.lat)
    }
}

impl From<Location> for (f64, f64) {
    fn from(loc: Location) -> Self {
        (loc.lon, loc.lat)
    }
}

/// Parses `lat,lon`.
impl FromStr for Location {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = parse_floats(s, 2)?;
        Ok(Location::new(values[0], values[1]))
    }
}

/// Where a feature is located, as far as the response tells us.
///
/// Nodes carry their coordinate directly, ways and relations only have a
/// representative center when queried with `out center`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coordinate {
    Direct(Location),
    Centered(Location),
    Unresolvable,
}

impl Coordinate {
    pub fn resolve(
        lat: Option<f64>,
        lon: Option<f64>,
        center: Option<(Option<f64>, Option<f64>)>,
    ) -> Self {
        if let (Some(lat), Some(lon)) = (lat, lon) {
            return Coordinate::Direct(Location::new(lat, lon));
        }
        match center {
            Some((Some(lat), Some(lon))) => Coordinate::Centered(Location::new(lat, lon)),
            _ => Coordinate::Unresolvable,
        }
    }

    pub fn location(&self) -> Option<Location> {
        match self {
            Coordinate::Direct(loc) | Coordinate::Centered(loc) => Some(*loc),
            Coordinate::Unresolvable => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct Bounds {
    pub s: f64,
    pub w: f64,
    pub n: f64,
    pub e: f64,
}

impl Bounds {
    pub fn new(s: f64, w: f64, n: f64, e: f64) -> Self {
        Bounds { s, w, n, e }
    }

    pub fn sw_ne(&self) -> (Location, Location) {
        (Location::new(self.s, self.w), Location::new(self.n, self.e))
    }
}

impl PartialEq<Bounds> for Bounds {
    fn eq(&self, other: &Self) -> bool {
        let (self_sw, self_ne) = self.sw_ne();
        let (other_sw, other_ne) = other.sw_ne();
        self_sw == other_sw && self_ne == other_ne
    }
}

/// Overpass bbox notation: `south,west,north,east`.
impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{},{},{}", self.s, self.w, self.n, self.e)
    }
}

impl FromStr for Bounds {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = parse_floats(s, 4)?;
        Ok(Bounds::new(values[0], values[1], values[2], values[3]))
    }
}

fn parse_floats(s: &str, expected: usize) -> Result<Vec<f64>, Error> {
    let values = s
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<f64>, _>>()
        .map_err(|e| Error::InvalidArgument(format!("{:?}: {}", s, e)))?;
    if values.len() != expected {
        let msg = format!("{:?}: expected {} comma separated numbers", s, expected);
        return Err(Error::InvalidArgument(msg));
    }
    Ok(values)
}
