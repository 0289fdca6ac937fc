use std::fmt;
use std::sync::{Arc, RwLock};

use serde_json::{Map, Value};

use crate::analytics::config::TrackingConfig;
use crate::analytics::constants::{DEFAULT_EVENT_CATEGORY, DEFAULT_EVENT_LABEL};
use crate::analytics::dimensions::map_dimensions;
use crate::analytics::error::{missing_field, AnalyticsResult};
use crate::analytics::hit::{Hit, HitKind};
use crate::analytics::logger::LOGGER;
use crate::analytics::session::TrackingSession;
use crate::analytics::transport::{
    HitTransport, MeasurementProtocolConfig, MeasurementProtocolTransport,
};

/// Translates page views, tracked events and identify calls into Measurement Protocol hits.
///
/// Cloning is cheap and clones share configuration, session and transport.
#[derive(Clone)]
pub struct GoogleAnalytics {
    inner: Arc<GoogleAnalyticsInner>,
}

struct GoogleAnalyticsInner {
    config: TrackingConfig,
    session: RwLock<TrackingSession>,
    transport: Arc<dyn HitTransport>,
}

impl fmt::Debug for GoogleAnalytics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleAnalytics")
            .field("tracking_id", &self.inner.config.tracking_id())
            .field("session", &*self.inner.session.read().unwrap())
            .finish()
    }
}

/// Fields of a page view. All three are required.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageView {
    pub path: Option<String>,
    pub href: Option<String>,
    pub title: Option<String>,
}

impl PageView {
    pub fn new(path: impl Into<String>, href: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            href: Some(href.into()),
            title: Some(title.into()),
        }
    }

    /// Reads `path`, `href` and `title` from page properties.
    pub fn from_properties(properties: &Map<String, Value>) -> Self {
        Self {
            path: property_text(properties, "path"),
            href: property_text(properties, "href"),
            title: property_text(properties, "title"),
        }
    }
}

/// A tracked event. `category` and `label` fall back to `All` and `NA` when unset; `event` is
/// passed through unchecked.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackedEvent {
    pub category: Option<String>,
    pub event: Option<String>,
    pub label: Option<String>,
    pub value: Option<Value>,
    pub properties: Map<String, Value>,
}

impl TrackedEvent {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: Some(event.into()),
            ..Default::default()
        }
    }

    /// Builds an event the way the host reports one: category, label and value are read from
    /// `properties`, which are also kept for dimension mapping.
    pub fn from_properties(event: Option<String>, properties: Map<String, Value>) -> Self {
        Self {
            category: property_text(&properties, "category"),
            event,
            label: property_text(&properties, "label"),
            value: properties.get("value").filter(|v| !v.is_null()).cloned(),
            properties,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_properties(mut self, properties: Map<String, Value>) -> Self {
        self.properties = properties;
        self
    }
}

impl GoogleAnalytics {
    /// Creates a dispatcher that posts hits to the Measurement Protocol collect endpoint.
    pub fn initialize(config: TrackingConfig) -> AnalyticsResult<Self> {
        Self::with_measurement_protocol(config, MeasurementProtocolConfig::new())
    }

    pub fn with_measurement_protocol(
        config: TrackingConfig,
        protocol: MeasurementProtocolConfig,
    ) -> AnalyticsResult<Self> {
        config.validate()?;
        let transport = MeasurementProtocolTransport::new(protocol)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Creates a dispatcher delivering hits through a caller supplied transport.
    pub fn with_transport(
        config: TrackingConfig,
        transport: Arc<dyn HitTransport>,
    ) -> AnalyticsResult<Self> {
        config.validate()?;
        LOGGER.debug(format!(
            "initialized google analytics for {}",
            config.tracking_id()
        ));
        Ok(Self {
            inner: Arc::new(GoogleAnalyticsInner {
                config,
                session: RwLock::new(TrackingSession::new()),
                transport,
            }),
        })
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.inner.config
    }

    /// Snapshot of the current client and user identity.
    pub fn session(&self) -> TrackingSession {
        self.inner.session.read().unwrap().clone()
    }

    /// Sends one page view hit. Fails without sending when `path`, `href` or `title` is missing
    /// or empty.
    pub fn record_page_view(&self, page: &PageView) -> AnalyticsResult<()> {
        let (Some(path), Some(href), Some(title)) = (
            non_empty(&page.path),
            non_empty(&page.href),
            non_empty(&page.title),
        ) else {
            return Err(missing_field(
                "Missing path, href or title in page call for GA",
            ));
        };

        let hit = self.build_hit(HitKind::PageView {
            path: path.to_string(),
            href: href.to_string(),
            title: title.to_string(),
        });
        self.dispatch(hit);
        Ok(())
    }

    /// Maps the event's custom dimensions and sends one event hit.
    pub fn record_event(&self, event: &TrackedEvent) -> AnalyticsResult<()> {
        let dimensions = map_dimensions(&event.properties, self.inner.config.custom_dimensions())?;
        let category = non_empty(&event.category).unwrap_or(DEFAULT_EVENT_CATEGORY);
        let label = non_empty(&event.label).unwrap_or(DEFAULT_EVENT_LABEL);

        let hit = self
            .build_hit(HitKind::Event {
                category: category.to_string(),
                action: event.event.clone(),
                label: label.to_string(),
                value: event.value.clone(),
            })
            .with_dimensions(dimensions);
        self.dispatch(hit);
        Ok(())
    }

    /// Sets the user id attached to every later hit; `None` clears it. Sends nothing.
    pub fn identify(&self, user_id: Option<&str>) {
        self.inner
            .session
            .write()
            .unwrap()
            .set_user_id(user_id.map(str::to_string));
    }

    /// Flushes and stops the transport. Later hits are dropped.
    pub fn shutdown(&self) {
        self.inner.transport.shutdown();
    }

    fn build_hit(&self, kind: HitKind) -> Hit {
        let session = self.inner.session.read().unwrap();
        Hit::new(self.inner.config.tracking_id(), &session, kind)
    }

    fn dispatch(&self, hit: Hit) {
        LOGGER.debug(format!(
            "dispatching {} hit for {}",
            hit.kind().hit_type(),
            hit.tracking_id()
        ));
        self.inner.transport.send(hit);
    }
}

/// Validates `config` and creates a dispatcher posting to the Measurement Protocol.
pub fn initialize(config: TrackingConfig) -> AnalyticsResult<GoogleAnalytics> {
    GoogleAnalytics::initialize(config)
}

pub fn page(page: &PageView, client: &GoogleAnalytics) -> AnalyticsResult<()> {
    client.record_page_view(page)
}

pub fn track(event: &TrackedEvent, client: &GoogleAnalytics) -> AnalyticsResult<()> {
    client.record_event(event)
}

pub fn identify(user_id: &str, client: &GoogleAnalytics) {
    client.identify(Some(user_id));
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}

/// Reads a property as text, treating `null`, `false`, `0` and `""` as unset.
fn property_text(properties: &Map<String, Value>, key: &str) -> Option<String> {
    match properties.get(key)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}
