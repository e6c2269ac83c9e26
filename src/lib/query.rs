use super::filter::Group;
use super::geo::Bounds;
use itertools::Itertools;

pub const CHARGER_SET: &str = "chargers";
pub const PLAYGROUND_SET: &str = "playgrounds_nearby";

const ELEMENT_TYPES: [&str; 3] = ["node", "way", "relation"];

fn statements(groups: &[Group], scope: &str) -> String {
    groups
        .iter()
        .cartesian_product(ELEMENT_TYPES.iter())
        .map(|(group, element_type)| format!("  {}{}({});", element_type, group, scope))
        .join("\n")
}

/// Builds an Overpass QL query which selects all chargers within `bounds`,
/// the playgrounds within `radius` meters of any of them and returns both
/// sets with a representative center for ways and relations.
pub fn build(
    bounds: &Bounds,
    chargers: &[Group],
    playgrounds: &[Group],
    radius: f64,
    timeout: u32,
) -> String {
    let charger_statements = statements(chargers, &bounds.to_string());
    let around = format!("around.{}:{}", CHARGER_SET, radius);
    let playground_statements = statements(playgrounds, &around);
    format!(
        "[out:json][timeout:{timeout}];\n\
         (\n{chargers}\n)->.{charger_set};\n\
         (\n{playgrounds}\n)->.{playground_set};\n\
         (\n  .{charger_set};\n  .{playground_set};\n);\n\
         out center;\n",
        timeout = timeout,
        chargers = charger_statements,
        charger_set = CHARGER_SET,
        playgrounds = playground_statements,
        playground_set = PLAYGROUND_SET,
    )
}
