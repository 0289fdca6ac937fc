//! Server-side Google Analytics plugin.
//!
//! Translates vendor-neutral page views, tracked events and identify calls into Universal
//! Analytics Measurement Protocol hits. Custom dimensions declared in [`TrackingConfig`] are
//! resolved from event properties and reported under their fixed parameter slots (`cd1`..`cd20`,
//! `uip`, `ua`, ...).
//!
//! ```no_run
//! use analytics_plugin_ga::analytics::{google_analytics, PageView, TrackedEvent, TrackingConfig};
//!
//! # fn main() -> Result<(), analytics_plugin_ga::analytics::error::AnalyticsError> {
//! let analytics = google_analytics(
//!     TrackingConfig::new("UA-123456-1").with_custom_dimension("plan", "dimension1"),
//! )?;
//! analytics.identify(Some("user-42"));
//! analytics.record_page_view(&PageView::new("/pricing", "https://example.com/pricing", "Pricing"))?;
//! analytics.record_event(&TrackedEvent::new("signup").with_category("Accounts"))?;
//! analytics.shutdown();
//! # Ok(())
//! # }
//! ```

mod api;
mod config;
pub mod constants;
mod dimensions;
pub mod error;
mod hit;
mod logger;
mod path;
mod plugin;
mod session;
mod transport;

pub use api::{identify, initialize, page, track, GoogleAnalytics, PageView, TrackedEvent};
pub use config::{CustomDimensions, TrackingConfig};
pub use constants::{rosetta_code, SemanticKey};
pub use dimensions::{map_dimensions, Dimensions};
pub use hit::{Hit, HitKind};
pub use path::{resolve_property, PropertyPath};
pub use plugin::{google_analytics, init, AnalyticsPlugin, PluginCall, PluginPayload};
pub use session::TrackingSession;
pub use transport::{
    HitTransport, MeasurementProtocolConfig, MeasurementProtocolEndpoint,
    MeasurementProtocolTransport, RecordingTransport, ENDPOINT_ENV_VAR,
};
