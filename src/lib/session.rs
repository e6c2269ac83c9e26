use super::correlate::correlate;
use super::error::{Error, Result};
use super::filter::{parse, Filter, Group};
use super::geo::{Bounds, Location};
use super::items::{Feature, Marker, MarkerKind};
use super::output::{render, MarkerLayer};
use super::overpass::{Fetch, DEFAULT_URL};
use super::query;
use super::viewport::{Viewport, MAX_ZOOM};
use tracing::{debug, error, info, warn};

pub const DEFAULT_RADIUS: f64 = 100.;
pub const DEFAULT_TIMEOUT: u32 = 25;
pub const DEFAULT_LOCATE_MAX_ZOOM: u8 = 16;
pub const DEFAULT_CHARGERS: &str = "amenity~charging_station";
pub const DEFAULT_PLAYGROUNDS: &str = "leisure~playground";

#[derive(Debug, Clone)]
pub struct Config {
    pub url: String,
    /// Meters between a charger and a playground to count as nearby.
    pub radius: f64,
    /// Server side query timeout in seconds.
    pub timeout: u32,
    pub chargers: Vec<Group>,
    pub playgrounds: Vec<Group>,
    /// Try locating once more when the first attempt fails.
    pub retry_locate: bool,
    pub locate_max_zoom: u8,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            url: DEFAULT_URL.into(),
            radius: DEFAULT_RADIUS,
            timeout: DEFAULT_TIMEOUT,
            chargers: parse(DEFAULT_CHARGERS),
            playgrounds: parse(DEFAULT_PLAYGROUNDS),
            retry_locate: false,
            locate_max_zoom: DEFAULT_LOCATE_MAX_ZOOM,
        }
    }
}

impl Config {
    /// Rejects settings no search could be run with.
    pub fn validate(&self) -> Result<()> {
        if !(self.radius >= 0.) {
            return Err(Error::InvalidArgument(format!(
                "radius must be a non-negative number of meters, got {}",
                self.radius
            )));
        }
        Ok(())
    }
}

/// Determines where the user currently is.
pub trait Locate {
    fn locate(&self) -> Result<Location>;
}

/// A locator which knows the position up front, if at all.
pub struct StaticLocator(pub Option<Location>);

impl Locate for StaticLocator {
    fn locate(&self) -> Result<Location> {
        self.0
            .ok_or_else(|| Error::Locate("no position available".into()))
    }
}

/// Identifies one search. Only the most recently issued ticket may render.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTicket {
    generation: u64,
    pub bounds: Bounds,
    pub query: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Rendered {
        chargers: usize,
        playgrounds: usize,
        pairs: usize,
        markers: usize,
    },
    /// A newer search was started before this one completed.
    Stale,
}

pub struct Session<F: Fetch> {
    config: Config,
    fetcher: F,
    viewport: Viewport,
    pinned_bounds: Option<Bounds>,
    layer: MarkerLayer,
    location_marker: Option<Marker>,
    generation: u64,
}

impl<F: Fetch> Session<F> {
    pub fn new(config: Config, fetcher: F, viewport: Viewport) -> Self {
        Session {
            config,
            fetcher,
            viewport,
            pinned_bounds: None,
            layer: MarkerLayer::new(),
            location_marker: None,
            generation: 0,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn layer(&self) -> &MarkerLayer {
        &self.layer
    }

    /// Moves the view, releasing any pinned search region.
    pub fn set_center(&mut self, center: Location) {
        self.viewport.set_view(center, self.viewport.zoom, MAX_ZOOM);
        self.pinned_bounds = None;
    }

    /// Searches `bounds` instead of the viewport's extent.
    pub fn pin_bounds(&mut self, bounds: Bounds) {
        self.pinned_bounds = Some(bounds);
    }

    pub fn bounds(&self) -> Bounds {
        self.pinned_bounds.unwrap_or_else(|| self.viewport.bounds())
    }

    fn location_found(&mut self, location: Location, zoom: u8, max_zoom: u8) {
        info!(lat = location.lat, lon = location.lon, "location found");
        self.viewport.set_view(location, zoom, max_zoom);
        self.pinned_bounds = None;
        self.location_marker = Some(Marker {
            kind: MarkerKind::UserLocation,
            osm_id: None,
            location,
            popup: "You are here".into(),
            icon: None,
        });
    }

    /// Centers the view on the user's position and marks it.
    ///
    /// With `retry_locate` set, a failed attempt is retried once and the
    /// resulting view is zoomed to at most `locate_max_zoom`.
    pub fn locate(&mut self, locator: &dyn Locate) -> Result<Location> {
        let err = match locator.locate() {
            Ok(location) => {
                self.location_found(location, self.viewport.zoom, MAX_ZOOM);
                return Ok(location);
            }
            Err(err) => err,
        };
        error!("{}", err);
        if !self.config.retry_locate {
            return Err(err);
        }
        warn!("retrying to locate");
        match locator.locate() {
            Ok(location) => {
                let max_zoom = self.config.locate_max_zoom;
                self.location_found(location, MAX_ZOOM, max_zoom);
                Ok(location)
            }
            Err(err) => {
                error!("{}", err);
                Err(err)
            }
        }
    }

    /// Starts a search of the current region. Any ticket issued earlier
    /// becomes stale.
    pub fn begin(&mut self) -> SearchTicket {
        self.generation += 1;
        let bounds = self.bounds();
        let query = query::build(
            &bounds,
            &self.config.chargers,
            &self.config.playgrounds,
            self.config.radius,
            self.config.timeout,
        );
        debug!(generation = self.generation, bbox = %bounds, "search started");
        SearchTicket {
            generation: self.generation,
            bounds,
            query,
        }
    }

    /// Renders the response to `ticket`, unless a newer search was begun in
    /// the meantime. A failed fetch leaves the layer as it was.
    pub fn finish(
        &mut self,
        ticket: SearchTicket,
        response: Result<Vec<Feature>>,
    ) -> Result<SearchOutcome> {
        if ticket.generation != self.generation {
            debug!(
                generation = ticket.generation,
                latest = self.generation,
                "ignoring late response"
            );
            return Ok(SearchOutcome::Stale);
        }
        let features = response?;

        let chargers: Vec<&Feature> = features
            .iter()
            .filter(|f| f.filter(&self.config.chargers))
            .collect();
        let playgrounds: Vec<&Feature> = features
            .iter()
            .filter(|f| f.filter(&self.config.playgrounds))
            .collect();
        let pairs = correlate(&chargers, &playgrounds, self.config.radius);
        render(&pairs, &mut self.layer);

        let outcome = SearchOutcome::Rendered {
            chargers: chargers.len(),
            playgrounds: playgrounds.len(),
            pairs: pairs.len(),
            markers: self.layer.len(),
        };
        info!(?outcome, "search finished");
        Ok(outcome)
    }

    /// One full cycle: query the current region, fetch, correlate, render.
    pub fn search(&mut self) -> Result<SearchOutcome> {
        let ticket = self.begin();
        let response = self.fetcher.fetch(&ticket.query);
        self.finish(ticket, response)
    }

    /// Everything drawn on the map, the user's position first.
    pub fn markers(&self) -> Vec<Marker> {
        self.location_marker
            .iter()
            .chain(self.layer.markers())
            .cloned()
            .collect()
    }
}
