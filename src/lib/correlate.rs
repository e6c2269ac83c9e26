use super::geo::Location;
use super::items::{CorrelatedPair, Feature, Nearby};
use tracing::debug;

/// Pairs every charger with the playgrounds at most `radius` meters away,
/// measured along the great circle.
pub fn correlate<'a>(
    chargers: &[&'a Feature],
    playgrounds: &[&'a Feature],
    radius: f64,
) -> Vec<CorrelatedPair<'a>> {
    correlate_with(chargers, playgrounds, radius, |a, b| a.distance(b))
}

/// Like [`correlate`], with a custom distance function.
///
/// Chargers without any playground in range are dropped, as are features
/// without a resolvable coordinate. The order of both inputs is preserved.
pub fn correlate_with<'a, D>(
    chargers: &[&'a Feature],
    playgrounds: &[&'a Feature],
    radius: f64,
    distance: D,
) -> Vec<CorrelatedPair<'a>>
where
    D: Fn(&Location, &Location) -> f64,
{
    let located: Vec<(&Feature, Location)> = playgrounds
        .iter()
        .filter_map(|&pg| {
            let location = pg.location();
            if location.is_none() {
                debug!(id = pg.id, "skipping playground without coordinate");
            }
            Some((pg, location?))
        })
        .collect();

    chargers
        .iter()
        .filter_map(|&charger| {
            let location = match charger.location() {
                Some(location) => location,
                None => {
                    debug!(id = charger.id, "skipping charger without coordinate");
                    return None;
                }
            };
            let nearby: Vec<Nearby> = located
                .iter()
                .filter_map(|&(playground, pg_location)| {
                    let meters = distance(&location, &pg_location);
                    // NaN is never nearby
                    if !(meters <= radius) {
                        return None;
                    }
                    Some(Nearby {
                        playground,
                        location: pg_location,
                        distance: meters,
                    })
                })
                .collect();
            if nearby.is_empty() {
                return None;
            }
            Some(CorrelatedPair {
                charger,
                location,
                playgrounds: nearby,
            })
        })
        .collect()
}
