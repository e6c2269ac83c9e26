use super::error::{Error, Result};
use super::geojson::{Entity, Geometry};
use super::items::{CorrelatedPair, Feature, Icon, Marker, MarkerKind};
use serde::Serialize;
use serde_json::{json, to_string, Value};
use std::collections::BTreeMap;
use std::io::Write;
use tracing::debug;

pub trait Output {
    fn write_geojson(&self, writer: &mut dyn Write) -> Result<()>;
    fn write_json_lines(&self, writer: &mut dyn Write) -> Result<()>;
}

/// The set of search result markers currently drawn on the map.
#[derive(Debug, Default)]
pub struct MarkerLayer {
    markers: Vec<Marker>,
}

impl MarkerLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    pub fn clear(&mut self) {
        self.markers.clear();
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Lists the charger's tags sorted by key, whatever order the response had,
/// followed by the playground count. Labels are English.
fn charger_popup(charger: &Feature, playground_count: usize) -> String {
    let mut popup = String::from("<b>Charging station</b>");
    for (key, value) in &charger.tags {
        popup += &format!("<br><b>{}</b>: {}", escape_html(key), escape_html(value));
    }
    popup += &format!("<br><b>Nearby playgrounds:</b> {}", playground_count);
    popup
}

fn playground_popup(charger_id: i64) -> String {
    format!("Playground near charging station {}", charger_id)
}

/// Replaces the content of `layer` with one marker per charger and one per
/// nearby playground.
pub fn render(pairs: &[CorrelatedPair], layer: &mut MarkerLayer) {
    layer.clear();
    for pair in pairs {
        layer.add(Marker {
            kind: MarkerKind::Charger,
            osm_id: Some(pair.charger.id),
            location: pair.location,
            popup: charger_popup(pair.charger, pair.playgrounds.len()),
            icon: Some(Icon::charger()),
        });
        for nearby in &pair.playgrounds {
            layer.add(Marker {
                kind: MarkerKind::Playground,
                osm_id: Some(nearby.playground.id),
                location: nearby.location,
                popup: playground_popup(pair.charger.id),
                icon: Some(Icon::playground()),
            });
        }
    }
    debug!(pairs = pairs.len(), markers = layer.len(), "rendered markers");
}

#[derive(Serialize)]
struct JSONMarker<'a> {
    kind: MarkerKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    osm_id: Option<i64>,
    lat: f64,
    lon: f64,
    popup: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon: Option<&'a Icon>,
}

impl<'a> From<&'a Marker> for JSONMarker<'a> {
    fn from(marker: &'a Marker) -> Self {
        JSONMarker {
            kind: marker.kind,
            osm_id: marker.osm_id,
            lat: marker.location.lat,
            lon: marker.location.lon,
            popup: &marker.popup,
            icon: marker.icon.as_ref(),
        }
    }
}

fn properties(marker: &Marker) -> BTreeMap<String, Value> {
    let mut properties = BTreeMap::new();
    properties.insert("kind".into(), json!(marker.kind));
    properties.insert("popup".into(), json!(marker.popup));
    if let Some(id) = marker.osm_id {
        properties.insert("osm_id".into(), json!(id));
    }
    if let Some(icon) = &marker.icon {
        properties.insert("icon_url".into(), json!(icon.url));
        properties.insert("icon_size".into(), json!(icon.size));
        properties.insert("icon_anchor".into(), json!(icon.anchor));
        properties.insert("popup_anchor".into(), json!(icon.popup_anchor));
    }
    properties
}

impl Output for Vec<Marker> {
    fn write_json_lines(&self, writer: &mut dyn Write) -> Result<()> {
        for marker in self.iter() {
            let json = to_string(&JSONMarker::from(marker)).map_err(Error::Json)?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    fn write_geojson(&self, writer: &mut dyn Write) -> Result<()> {
        let features = self
            .iter()
            .map(|marker| Entity::Feature {
                geometry: Geometry::Point {
                    coordinates: marker.location.into(),
                },
                properties: properties(marker),
            })
            .collect();
        let feature_collection = Entity::FeatureCollection { features };
        let string = to_string(&feature_collection).map_err(Error::Json)?;
        writeln!(writer, "{}", string)?;
        Ok(())
    }
}
