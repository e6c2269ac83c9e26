use super::geo::{Coordinate, Location};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type Tags = BTreeMap<String, String>;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Node,
    Way,
    Relation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: i64,
    pub osm_type: ElementType,
    pub coordinate: Coordinate,
    pub tags: Tags,
}

impl Feature {
    pub fn location(&self) -> Option<Location> {
        self.coordinate.location()
    }
}

/// A charger together with the playgrounds found within the search radius.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelatedPair<'a> {
    pub charger: &'a Feature,
    pub location: Location,
    pub playgrounds: Vec<Nearby<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Nearby<'a> {
    pub playground: &'a Feature,
    pub location: Location,
    pub distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Charger,
    Playground,
    UserLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Icon {
    pub url: String,
    pub size: [u32; 2],
    pub anchor: [i32; 2],
    pub popup_anchor: [i32; 2],
}

impl Icon {
    fn pin(url: &str) -> Self {
        Icon {
            url: url.into(),
            size: [25, 25],
            anchor: [12, 25],
            popup_anchor: [0, -25],
        }
    }

    pub fn charger() -> Self {
        Icon::pin("https://cdn-icons-png.flaticon.com/512/3103/3103446.png")
    }

    pub fn playground() -> Self {
        Icon::pin("https://cdn-icons-png.flaticon.com/512/854/854866.png")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub osm_id: Option<i64>,
    pub location: Location,
    pub popup: String,
    pub icon: Option<Icon>,
}
