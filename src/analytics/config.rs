use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::analytics::error::{configuration_error, AnalyticsResult};

/// Caller dimension name (a property key or dotted path) to semantic key, e.g.
/// `"userType" -> "dimension3"`. Entries keep their declared order.
pub type CustomDimensions = IndexMap<String, String>;

/// Settings the plugin is constructed with. Mirrors the host's JSON shape
/// `{ "trackingId": "UA-XXXX-Y", "customDimensions": { ... } }`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingConfig {
    #[serde(default)]
    tracking_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    custom_dimensions: CustomDimensions,
}

impl TrackingConfig {
    pub fn new(tracking_id: impl Into<String>) -> Self {
        Self {
            tracking_id: tracking_id.into(),
            custom_dimensions: CustomDimensions::new(),
        }
    }

    pub fn with_custom_dimension(
        mut self,
        name: impl Into<String>,
        semantic_key: impl Into<String>,
    ) -> Self {
        self.custom_dimensions
            .insert(name.into(), semantic_key.into());
        self
    }

    pub fn with_custom_dimensions<I, K, V>(mut self, dimensions: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.custom_dimensions.extend(
            dimensions
                .into_iter()
                .map(|(name, key)| (name.into(), key.into())),
        );
        self
    }

    /// Parses the host's JSON configuration object.
    pub fn from_json(input: &str) -> AnalyticsResult<Self> {
        serde_json::from_str(input)
            .map_err(|err| configuration_error(format!("invalid plugin configuration: {err}")))
    }

    /// Like [`TrackingConfig::from_json`] for an already parsed value. `null` yields the empty
    /// configuration, which fails [`TrackingConfig::validate`].
    pub fn from_value(value: Value) -> AnalyticsResult<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value)
            .map_err(|err| configuration_error(format!("invalid plugin configuration: {err}")))
    }

    pub fn tracking_id(&self) -> &str {
        &self.tracking_id
    }

    pub fn custom_dimensions(&self) -> &CustomDimensions {
        &self.custom_dimensions
    }

    /// Fails with a configuration error when no tracking id is set.
    pub fn validate(&self) -> AnalyticsResult<()> {
        if self.tracking_id.is_empty() {
            return Err(configuration_error(
                "No google analytics trackingId defined",
            ));
        }
        Ok(())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<CustomDimensions, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<CustomDimensions>::deserialize(deserializer)?.unwrap_or_default())
}
