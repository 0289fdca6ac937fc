//! Host-facing plugin surface.
//!
//! An analytics host drives plugins through three hooks (`page`, `track`, `identify`), each
//! receiving a call envelope of the shape
//!
//! ```json
//! { "payload": { "properties": {...}, "event": "signup", "userId": "u-1" }, "config": {...} }
//! ```
//!
//! [`AnalyticsPlugin`] is that contract; [`GoogleAnalytics`] implements it.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::analytics::api::{GoogleAnalytics, PageView, TrackedEvent};
use crate::analytics::config::TrackingConfig;
use crate::analytics::constants::PLUGIN_NAME;
use crate::analytics::error::{invalid_argument, AnalyticsResult};

pub trait AnalyticsPlugin: Send + Sync {
    fn name(&self) -> &str;

    fn config(&self) -> &TrackingConfig;

    /// Reports `payload.properties.{path, href, title}` as a page view.
    fn page(&self, call: &PluginCall) -> AnalyticsResult<()>;

    /// Reports `payload.event` with category, label, value and dimensions taken from
    /// `payload.properties`.
    fn track(&self, call: &PluginCall) -> AnalyticsResult<()>;

    /// Attaches `payload.userId` to subsequent hits.
    fn identify(&self, call: &PluginCall) -> AnalyticsResult<()>;
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginPayload {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// One invocation envelope from the host.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PluginCall {
    #[serde(default)]
    pub payload: PluginPayload,
    #[serde(default)]
    pub config: Value,
}

impl PluginCall {
    pub fn from_json(input: &str) -> AnalyticsResult<Self> {
        serde_json::from_str(input)
            .map_err(|err| invalid_argument(format!("invalid plugin call envelope: {err}")))
    }

    pub fn page(properties: Map<String, Value>) -> Self {
        Self {
            payload: PluginPayload {
                properties,
                ..Default::default()
            },
            config: Value::Null,
        }
    }

    pub fn track(event: impl Into<String>, properties: Map<String, Value>) -> Self {
        Self {
            payload: PluginPayload {
                properties,
                event: Some(event.into()),
                user_id: None,
            },
            config: Value::Null,
        }
    }

    pub fn identify(user_id: impl Into<String>) -> Self {
        Self {
            payload: PluginPayload {
                user_id: Some(user_id.into()),
                ..Default::default()
            },
            config: Value::Null,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl AnalyticsPlugin for GoogleAnalytics {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn config(&self) -> &TrackingConfig {
        GoogleAnalytics::config(self)
    }

    fn page(&self, call: &PluginCall) -> AnalyticsResult<()> {
        self.record_page_view(&PageView::from_properties(&call.payload.properties))
    }

    fn track(&self, call: &PluginCall) -> AnalyticsResult<()> {
        let event = TrackedEvent::from_properties(
            call.payload.event.clone(),
            call.payload.properties.clone(),
        );
        self.record_event(&event)
    }

    fn identify(&self, call: &PluginCall) -> AnalyticsResult<()> {
        GoogleAnalytics::identify(self, call.payload.user_id.as_deref());
        Ok(())
    }
}

/// Creates the Google Analytics plugin. Fails when `config` has no tracking id.
pub fn google_analytics(config: TrackingConfig) -> AnalyticsResult<GoogleAnalytics> {
    GoogleAnalytics::initialize(config)
}

/// Alias of [`google_analytics`] for hosts that look plugins up by an `init` entry point.
pub fn init(config: TrackingConfig) -> AnalyticsResult<GoogleAnalytics> {
    google_analytics(config)
}
