//! Categorical mapping: total functions from a bounded string vocabulary
//! to gauge values.
//!
//! Every table carries an explicit default, so an unrecognised input still
//! produces a defined value. Matching is exact and case-sensitive, as the
//! API reports these fields verbatim.

/// A fixed mapping from field values to gauge values.
#[derive(Debug, Clone, Copy)]
pub struct CategoricalMap {
    /// Wire field the map applies to.
    pub field: &'static str,
    pub arms: &'static [(&'static str, f64)],
    /// Value for anything outside `arms`.
    pub default: f64,
}

impl CategoricalMap {
    pub const fn new(field: &'static str, arms: &'static [(&'static str, f64)], default: f64) -> Self {
        Self {
            field,
            arms,
            default,
        }
    }

    pub fn map(&self, input: &str) -> f64 {
        self.arms
            .iter()
            .find(|(known, _)| *known == input)
            .map_or(self.default, |(_, value)| *value)
    }

    pub fn is_known(&self, input: &str) -> bool {
        self.arms.iter().any(|(known, _)| *known == input)
    }

    pub fn vocabulary(&self) -> impl Iterator<Item = &'static str> {
        self.arms.iter().map(|(known, _)| *known)
    }
}

pub fn bool_value(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}

pub const RATING: CategoricalMap = CategoricalMap::new("rating", &[("good", 1.0)], 0.0);

pub const LINK_STATUS: CategoricalMap = CategoricalMap::new("status", &[("up", 1.0)], 0.0);

pub const SWITCH_CONNECTION: CategoricalMap =
    CategoricalMap::new("status", &[("Connected", 1.0)], 0.0);

pub const DUPLEX: CategoricalMap =
    CategoricalMap::new("duplex", &[("full", 1.0), ("half", 0.5)], 0.0);

pub const SANDBOX_CONNECTION: CategoricalMap = CategoricalMap::new(
    "status",
    &[("unreachable", 0.0), ("reachable", 1.0), ("disabled", -1.0)],
    -2.0,
);

pub const AUTHORIZATION_STATE: CategoricalMap = CategoricalMap::new(
    "state",
    &[("Authorized", 1.0), ("DeAuthorized", 0.0), ("Discovered", 2.0)],
    -1.0,
);

// Anything that is not "normal" is treated as backup mode.
pub const MANAGEMENT_MODE: CategoricalMap =
    CategoricalMap::new("mode", &[("normal", 1.0), ("backup", 2.0)], 2.0);

pub const MANAGEMENT_STATUS: CategoricalMap = CategoricalMap::new(
    "status",
    &[("down", 0.0), ("up", 1.0), ("handshake", 2.0)],
    -1.0,
);

pub const REGISTRATION_STATUS: CategoricalMap = CategoricalMap::new(
    "registration_status",
    &[("in_progress", 1.0), ("registered", 0.0), ("unregistered", 2.0)],
    -1.0,
);
