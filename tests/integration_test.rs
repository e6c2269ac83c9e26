extern crate playground_chargers;

use geojson::GeoJson;
use playground_chargers::{
    parse_response, Bounds, Config, Feature, Fetch, MarkerKind, Output, SearchOutcome, Session,
    Viewport,
};
use std::cell::RefCell;
use std::fs::read_to_string;
use std::io::{Cursor, Read, Seek, SeekFrom};

struct FileFetcher {
    path: &'static str,
    queries: RefCell<Vec<String>>,
}

impl FileFetcher {
    fn new(path: &'static str) -> Self {
        FileFetcher {
            path,
            queries: RefCell::new(vec![]),
        }
    }
}

impl Fetch for FileFetcher {
    fn fetch(&self, query: &str) -> playground_chargers::Result<Vec<Feature>> {
        self.queries.borrow_mut().push(query.into());
        let body = read_to_string(self.path)?;
        parse_response(&body)
    }
}

fn get_string(cursor: &mut Cursor<Vec<u8>>) -> String {
    cursor.seek(SeekFrom::Start(0)).unwrap();
    let mut out = Vec::new();
    cursor.read_to_end(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn berlin_session() -> Session<FileFetcher> {
    let fetcher = FileFetcher::new("./tests/data/overpass_berlin.json");
    let mut session = Session::new(Config::default(), fetcher, Viewport::default());
    session.pin_bounds(Bounds::new(52.5, 13.3, 52.6, 13.5));
    session
}

#[test]
fn chargers_with_playgrounds() {
    let mut session = berlin_session();
    let outcome = session.search().unwrap();
    assert_eq!(
        outcome,
        SearchOutcome::Rendered {
            chargers: 4,
            playgrounds: 5,
            pairs: 2,
            markers: 5,
        }
    );

    let markers: Vec<(MarkerKind, Option<i64>)> = session
        .markers()
        .iter()
        .map(|m| (m.kind, m.osm_id))
        .collect();
    assert_eq!(
        markers,
        vec![
            (MarkerKind::Charger, Some(101)),
            (MarkerKind::Playground, Some(201)),
            (MarkerKind::Playground, Some(202)),
            (MarkerKind::Charger, Some(103)),
            (MarkerKind::Playground, Some(204)),
        ]
    );

    let charger = &session.layer().markers()[0];
    assert!(charger.popup.contains("<b>operator</b>: Stromnetz Berlin"));
    assert!(charger.popup.ends_with("<b>Nearby playgrounds:</b> 2"));
    let playground = &session.layer().markers()[4];
    assert_eq!(playground.popup, "Playground near charging station 103");
}

#[test]
fn query_covers_pinned_bounds() {
    let mut session = berlin_session();
    session.search().unwrap();
    let queries = session.fetcher().queries.borrow();
    assert_eq!(queries.len(), 1);
    let query = &queries[0];
    assert!(query.starts_with("[out:json][timeout:25];"));
    assert!(query.contains(r#"node["amenity"="charging_station"](52.5,13.3,52.6,13.5);"#));
    assert!(query.contains(r#"relation["leisure"="playground"](around.chargers:100);"#));
    assert!(query.trim_end().ends_with("out center;"));
}

#[test]
fn geojson_output() {
    let mut session = berlin_session();
    session.search().unwrap();

    let mut cursor = Cursor::new(Vec::new());
    session.markers().write_geojson(&mut cursor).unwrap();
    let string = get_string(&mut cursor);

    let geojson: GeoJson = string.trim().parse().unwrap();
    match geojson {
        GeoJson::FeatureCollection(collection) => {
            assert_eq!(collection.features.len(), 5);
            let first = &collection.features[0];
            let properties = first.properties.as_ref().unwrap();
            assert_eq!(properties["kind"], "charger");
            assert_eq!(properties["osm_id"], 101);
        }
        _ => panic!("expected a feature collection"),
    }
}

#[test]
fn json_lines_output() {
    let mut session = berlin_session();
    session.search().unwrap();

    let mut cursor = Cursor::new(Vec::new());
    session.markers().write_json_lines(&mut cursor).unwrap();
    let string = get_string(&mut cursor);
    let lines: Vec<&str> = string.trim().split('\n').collect();
    assert_eq!(lines.len(), 5);
    for line in lines {
        assert!(line.contains(r#""kind":"charger""#) || line.contains(r#""kind":"playground""#));
    }
}

#[test]
fn repeated_search_is_stable() {
    let mut session = berlin_session();
    session.search().unwrap();
    let first = session.markers();
    session.search().unwrap();
    assert_eq!(session.markers(), first);
}
