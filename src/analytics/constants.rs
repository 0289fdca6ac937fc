//! Fixed identifiers for the Google Analytics plugin and the Rosetta Table that translates
//! vendor-neutral dimension names into Measurement Protocol parameter codes.

use std::fmt;
use std::str::FromStr;

/// Name the plugin registers under with the host framework.
pub const PLUGIN_NAME: &str = "google-analytics";
/// Category reported when a tracked event carries none.
pub const DEFAULT_EVENT_CATEGORY: &str = "All";
/// Label reported when a tracked event carries none.
pub const DEFAULT_EVENT_LABEL: &str = "NA";
/// Client field written by `identify`.
pub const USER_ID_FIELD: &str = "uid";
pub const PROTOCOL_VERSION: &str = "1";

/// A vendor-neutral dimension name accepted in a custom dimension table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SemanticKey {
    Dimension1,
    Dimension2,
    Dimension3,
    Dimension4,
    Dimension5,
    Dimension6,
    Dimension7,
    Dimension8,
    Dimension9,
    Dimension10,
    Dimension11,
    Dimension12,
    Dimension13,
    Dimension14,
    Dimension15,
    Dimension16,
    Dimension17,
    Dimension18,
    Dimension19,
    Dimension20,
    IpAddress,
    UserAgent,
    GeoLocation,
    AppName,
    AppId,
    AppVersion,
    AppInstallerId,
}

/// `(semantic key, name, wire code)` rows of the Rosetta Table.
const ROSETTA_TABLE: [(SemanticKey, &str, &str); 27] = [
    (SemanticKey::Dimension1, "dimension1", "cd1"),
    (SemanticKey::Dimension2, "dimension2", "cd2"),
    (SemanticKey::Dimension3, "dimension3", "cd3"),
    (SemanticKey::Dimension4, "dimension4", "cd4"),
    (SemanticKey::Dimension5, "dimension5", "cd5"),
    (SemanticKey::Dimension6, "dimension6", "cd6"),
    (SemanticKey::Dimension7, "dimension7", "cd7"),
    (SemanticKey::Dimension8, "dimension8", "cd8"),
    (SemanticKey::Dimension9, "dimension9", "cd9"),
    (SemanticKey::Dimension10, "dimension10", "cd10"),
    (SemanticKey::Dimension11, "dimension11", "cd11"),
    (SemanticKey::Dimension12, "dimension12", "cd12"),
    (SemanticKey::Dimension13, "dimension13", "cd13"),
    (SemanticKey::Dimension14, "dimension14", "cd14"),
    (SemanticKey::Dimension15, "dimension15", "cd15"),
    (SemanticKey::Dimension16, "dimension16", "cd16"),
    (SemanticKey::Dimension17, "dimension17", "cd17"),
    (SemanticKey::Dimension18, "dimension18", "cd18"),
    (SemanticKey::Dimension19, "dimension19", "cd19"),
    (SemanticKey::Dimension20, "dimension20", "cd20"),
    (SemanticKey::IpAddress, "ipAddress", "uip"),
    (SemanticKey::UserAgent, "userAgent", "ua"),
    (SemanticKey::GeoLocation, "geoLocation", "geoid"),
    (SemanticKey::AppName, "appName", "an"),
    (SemanticKey::AppId, "appId", "aid"),
    (SemanticKey::AppVersion, "appVersion", "av"),
    (SemanticKey::AppInstallerId, "appInstallerId", "aiid"),
];

impl SemanticKey {
    pub const ALL: [SemanticKey; 27] = {
        let mut keys = [SemanticKey::Dimension1; 27];
        let mut i = 0;
        while i < ROSETTA_TABLE.len() {
            keys[i] = ROSETTA_TABLE[i].0;
            i += 1;
        }
        keys
    };

    /// Looks a semantic key up by its exact, case-sensitive name.
    pub fn parse(name: &str) -> Option<SemanticKey> {
        ROSETTA_TABLE
            .iter()
            .find(|(_, key_name, _)| *key_name == name)
            .map(|(key, _, _)| *key)
    }

    pub fn as_str(self) -> &'static str {
        ROSETTA_TABLE[self as usize].1
    }

    /// The Measurement Protocol parameter this key is reported under.
    pub fn wire_code(self) -> &'static str {
        ROSETTA_TABLE[self as usize].2
    }
}

impl fmt::Display for SemanticKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SemanticKey {
    type Err = crate::analytics::error::AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SemanticKey::parse(s).ok_or_else(|| crate::analytics::error::unknown_semantic_key(s))
    }
}

/// Translates a semantic key name straight to its wire code.
pub fn rosetta_code(name: &str) -> Option<&'static str> {
    SemanticKey::parse(name).map(SemanticKey::wire_code)
}
