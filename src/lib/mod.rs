//! Finds EV charging stations with a playground close by.
//!
//! A search builds an Overpass query for the current map region, fetches
//! chargers and the playgrounds around them, pairs them by great-circle
//! distance and draws the pairs as markers, which can be written out as
//! GeoJSON or JSON lines.

pub use self::correlate::{correlate, correlate_with};
pub use self::error::{Error, Result};
pub use self::geo::{Bounds, Coordinate, Location};
pub use self::items::{CorrelatedPair, ElementType, Feature, Marker, MarkerKind, Nearby, Tags};
pub use self::output::{render, MarkerLayer, Output};
pub use self::overpass::{parse_response, Client, Fetch};
pub use self::session::{Config, Locate, SearchOutcome, SearchTicket, Session, StaticLocator};
pub use self::viewport::Viewport;

pub mod correlate;
mod error;
pub mod filter;
pub mod geo;
mod geojson;
pub mod items;
pub mod output;
pub mod overpass;
pub mod query;
pub mod session;
pub mod viewport;
