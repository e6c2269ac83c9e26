use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Serialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: (f64, f64) },
}

#[derive(Serialize)]
#[serde(tag = "type")]
pub enum Entity {
    Feature {
        properties: BTreeMap<String, Value>,
        geometry: Geometry,
    },
    FeatureCollection {
        features: Vec<Entity>,
    },
}
