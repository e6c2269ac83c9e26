use super::geo::{Bounds, Location};
use std::f64::consts::PI;

pub const TILE_SIZE: f64 = 256.;
pub const MAX_ZOOM: u8 = 19;
const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

/// The visible part of a web mercator map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: Location,
    pub zoom: u8,
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            center: Location::new(52.52, 13.405),
            zoom: 13,
            width: 1024,
            height: 768,
        }
    }
}

fn scale(zoom: u8) -> f64 {
    TILE_SIZE * 2f64.powi(i32::from(zoom))
}

fn project(location: &Location, zoom: u8) -> (f64, f64) {
    let lat = location.lat.max(-MAX_LATITUDE).min(MAX_LATITUDE).to_radians();
    let x = (location.lon + 180.) / 360.;
    let y = (1. - (lat.tan() + 1. / lat.cos()).ln() / PI) / 2.;
    (x * scale(zoom), y * scale(zoom))
}

fn unproject(x: f64, y: f64, zoom: u8) -> Location {
    let x = x / scale(zoom);
    let y = y / scale(zoom);
    let lon = x * 360. - 180.;
    let lat = (PI * (1. - 2. * y)).sinh().atan().to_degrees();
    Location::new(lat, lon)
}

impl Viewport {
    pub fn new(center: Location, zoom: u8, width: u32, height: u32) -> Self {
        Viewport {
            center,
            zoom: zoom.min(MAX_ZOOM),
            width,
            height,
        }
    }

    /// Centers the view on `center`, zooming to at most `max_zoom`.
    pub fn set_view(&mut self, center: Location, zoom: u8, max_zoom: u8) {
        self.center = center;
        self.zoom = zoom.min(max_zoom).min(MAX_ZOOM);
    }

    pub fn bounds(&self) -> Bounds {
        let (x, y) = project(&self.center, self.zoom);
        let half_width = f64::from(self.width) / 2.;
        let half_height = f64::from(self.height) / 2.;
        let sw = unproject(x - half_width, y + half_height, self.zoom);
        let ne = unproject(x + half_width, y - half_height, self.zoom);
        Bounds::new(sw.lat, sw.lon, ne.lat, ne.lon)
    }
}
