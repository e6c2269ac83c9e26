use super::items::{Feature, Tags};
use smartstring::alias::String;
use std::fmt;

#[derive(PartialEq, Debug, Clone)]
pub enum Condition {
    TagPresence(String),
    ValueMatch(String, String),
}

impl Condition {
    pub fn new(tag: &str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            return Condition::ValueMatch(tag.into(), value.into());
        }
        Condition::TagPresence(tag.into())
    }
}

/// Overpass tag filter notation, e.g. `["amenity"="charging_station"]`.
impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Condition::TagPresence(key) => write!(f, "[\"{}\"]", escape(key)),
            Condition::ValueMatch(key, value) => {
                write!(f, "[\"{}\"=\"{}\"]", escape(key), escape(value))
            }
        }
    }
}

fn escape(s: &str) -> std::string::String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[derive(PartialEq, Debug, Clone)]
pub struct Group {
    pub conditions: Vec<Condition>,
}

/// All conditions of a group, chained the way Overpass intersects tag filters.
impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for condition in &self.conditions {
            write!(f, "{}", condition)?;
        }
        Ok(())
    }
}

fn parse_condition(condition_str: &str) -> Condition {
    let split_str: Vec<&str> = condition_str.splitn(2, '~').collect();
    if split_str.len() < 2 {
        Condition::TagPresence(condition_str.into())
    } else {
        let key = split_str[0];
        let value = split_str[1];
        Condition::ValueMatch(key.into(), value.into())
    }
}

fn parse_group(group_str: &str) -> Group {
    let condition_strs: Vec<&str> = group_str.split('+').collect();
    let conditions = condition_strs.into_iter().map(parse_condition).collect();
    Group { conditions }
}

/// Parse an expression into filter groups
///
/// Stating a key (`amenity`), will pick all features which are tagged using that key.
/// To further narrow down the results, a specific value can be given using a `~` field
/// separator (`amenity~charging_station`). To check the presence of multiple tags for the
/// same feature, statements can be combined using the `+` operator
/// (`'leisure~playground+access~yes'`). Finally, options can be specified by concatenating
/// groups of statements with `,` (`leisure~playground,playground`). If a feature matches the
/// criteria of either group it will be selected.
///
/// # Example
///
/// ```
/// use playground_chargers::filter::parse;
///
/// let groups = parse("leisure~playground+access~yes,amenity~kindergarten");
/// assert_eq!(groups.len(), 2);
/// let group = &groups[0];
/// assert_eq!(group.conditions.len(), 2);
/// ```
pub fn parse(selector_str: &str) -> Vec<Group> {
    let group_strs: Vec<&str> = selector_str.split(',').collect();
    group_strs.into_iter().map(parse_group).collect()
}

fn check_condition(tags: &Tags, condition: &Condition) -> bool {
    match condition {
        Condition::TagPresence(key) => tags.contains_key(key.as_str()),
        Condition::ValueMatch(key, value) => {
            tags.get(key.as_str()).map(|v| v.as_str()) == Some(value.as_str())
        }
    }
}

fn check_group(tags: &Tags, group: &Group) -> bool {
    group.conditions.iter().all(|c| check_condition(tags, c))
}

pub trait Filter {
    fn filter(&self, groups: &[Group]) -> bool;
}

impl Filter for Tags {
    fn filter(&self, groups: &[Group]) -> bool {
        groups.iter().any(|c| check_group(self, c))
    }
}

impl Filter for Feature {
    fn filter(&self, groups: &[Group]) -> bool {
        self.tags.filter(groups)
    }
}
