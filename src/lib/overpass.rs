use super::error::{Error, Result};
use super::geo::Coordinate;
use super::items::{ElementType, Feature, Tags};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_URL: &str = "https://overpass-api.de/api/interpreter";

#[derive(Deserialize)]
struct JSONCenter {
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Deserialize)]
struct JSONElement {
    #[serde(rename = "type")]
    osm_type: ElementType,
    id: i64,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<JSONCenter>,
    #[serde(default)]
    tags: Tags,
}

#[derive(Deserialize)]
struct JSONResponse {
    elements: Vec<JSONElement>,
}

impl From<JSONElement> for Feature {
    fn from(element: JSONElement) -> Self {
        let center = element.center.map(|c| (c.lat, c.lon));
        let coordinate = Coordinate::resolve(element.lat, element.lon, center);
        Feature {
            id: element.id,
            osm_type: element.osm_type,
            coordinate,
            tags: element.tags,
        }
    }
}

/// Parses an Overpass JSON response body into features, in response order.
pub fn parse_response(body: &str) -> Result<Vec<Feature>> {
    let response: JSONResponse = serde_json::from_str(body).map_err(Error::Parse)?;
    let features = response.elements.into_iter().map(Feature::from).collect();
    Ok(features)
}

/// Runs a query against a geodata service.
pub trait Fetch {
    fn fetch(&self, query: &str) -> Result<Vec<Feature>>;
}

pub struct Client {
    url: String,
    http: reqwest::blocking::Client,
}

impl Client {
    pub fn new(url: &str) -> Result<Self> {
        // the query text carries the server side timeout
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(None::<Duration>)
            .build()?;
        Ok(Client {
            url: url.into(),
            http,
        })
    }
}

impl Fetch for Client {
    fn fetch(&self, query: &str) -> Result<Vec<Feature>> {
        debug!(url = %self.url, "posting overpass query:\n{}", query);
        let response = self.http.post(self.url.as_str()).body(query.to_owned()).send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }
        let features = parse_response(&body)?;
        info!(count = features.len(), "received overpass elements");
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Location;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread::{self, JoinHandle};

    fn read_request(stream: &mut TcpStream) -> String {
        let mut request = Vec::new();
        let mut buf = [0; 1024];
        loop {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&request);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if request.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&request).into_owned()
    }

    /// Answers a single request with `status` and `body`, handing back the
    /// raw request text.
    fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/api/interpreter", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            request
        });
        (url, handle)
    }

    #[test]
    fn fetch_posts_query() {
        let body = r#"{"elements": [{"type": "node", "id": 1, "lat": 52.52, "lon": 13.405}]}"#;
        let (url, server) = serve_once("200 OK", body);
        let client = Client::new(&url).unwrap();
        let features = client.fetch("[out:json];node(1);out;").unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].id, 1);

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /api/interpreter "));
        assert!(request.ends_with("[out:json];node(1);out;"));
    }

    #[test]
    fn fetch_unreachable_host() {
        let client = Client::new("http://127.0.0.1:1").unwrap();
        assert!(matches!(client.fetch("[out:json];"), Err(Error::Network(_))));
    }

    #[test]
    fn fetch_error_status() {
        let (url, server) = serve_once("504 Gateway Timeout", "rate limited");
        let client = Client::new(&url).unwrap();
        match client.fetch("[out:json];") {
            Err(Error::Status { status, body }) => {
                assert_eq!(status, 504);
                assert_eq!(body, "rate limited");
            }
            other => panic!("expected status error, got {:?}", other),
        }
        server.join().unwrap();
    }

    #[test]
    fn fetch_non_json_body() {
        let (url, server) = serve_once("200 OK", "<html>busy</html>");
        let client = Client::new(&url).unwrap();
        assert!(matches!(client.fetch("[out:json];"), Err(Error::Parse(_))));
        server.join().unwrap();
    }

    #[test]
    fn parse_nodes_and_ways() {
        let body = r#"{
            "version": 0.6,
            "elements": [
                {"type": "node", "id": 1, "lat": 52.52, "lon": 13.405,
                 "tags": {"amenity": "charging_station", "capacity": "2"}},
                {"type": "way", "id": 2, "center": {"lat": 52.5205, "lon": 13.405},
                 "nodes": [3, 4, 5], "tags": {"leisure": "playground"}},
                {"type": "relation", "id": 6}
            ]
        }"#;
        let features = parse_response(body).unwrap();
        assert_eq!(features.len(), 3);

        assert_eq!(features[0].id, 1);
        assert_eq!(features[0].osm_type, ElementType::Node);
        assert_eq!(
            features[0].coordinate,
            Coordinate::Direct(Location::new(52.52, 13.405))
        );
        assert_eq!(features[0].tags["capacity"], "2");

        assert_eq!(features[1].osm_type, ElementType::Way);
        assert_eq!(
            features[1].coordinate,
            Coordinate::Centered(Location::new(52.5205, 13.405))
        );

        assert_eq!(features[2].coordinate, Coordinate::Unresolvable);
        assert!(features[2].tags.is_empty());
    }

    #[test]
    fn parse_empty_result() {
        let features = parse_response(r#"{"elements": []}"#).unwrap();
        assert!(features.is_empty());
    }

    #[test]
    fn reject_non_json() {
        let body = "<?xml version=\"1.0\"?><osm><remark>runtime error</remark></osm>";
        match parse_response(body) {
            Err(Error::Parse(_)) => (),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn reject_missing_elements() {
        assert!(matches!(
            parse_response(r#"{"remark": "timeout"}"#),
            Err(Error::Parse(_))
        ));
    }
}
