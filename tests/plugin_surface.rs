use std::sync::Arc;

use analytics_plugin_ga::analytics::{
    google_analytics, AnalyticsPlugin, GoogleAnalytics, HitKind, MeasurementProtocolConfig,
    MeasurementProtocolEndpoint, PluginCall, RecordingTransport, TrackingConfig,
};
use httpmock::prelude::*;
use serde_json::json;

#[test]
fn host_envelopes_drive_the_plugin() {
    let config = TrackingConfig::from_json(
        r#"{"trackingId":"UA-555-2","customDimensions":{"account.tier":"dimension1","beta":"dimension2"}}"#,
    )
    .unwrap();
    let transport = RecordingTransport::new();
    let plugin: Box<dyn AnalyticsPlugin> = Box::new(
        GoogleAnalytics::with_transport(config, Arc::new(transport.clone())).unwrap(),
    );

    plugin
        .identify(&PluginCall::from_json(r#"{"payload":{"userId":"u-17"}}"#).unwrap())
        .unwrap();
    plugin
        .page(
            &PluginCall::from_json(
                r#"{"payload":{"properties":{"path":"/a","href":"https://x.test/a","title":"A"}}}"#,
            )
            .unwrap(),
        )
        .unwrap();
    plugin
        .track(
            &PluginCall::from_json(
                r#"{"payload":{"event":"upgrade","properties":{"category":"Billing","value":3,
                    "account":{"tier":"gold"},"beta":false}}}"#,
            )
            .unwrap(),
        )
        .unwrap();

    let hits = transport.hits();
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|hit| hit.user_id() == Some("u-17")));
    assert_eq!(
        hits[1].kind(),
        &HitKind::Event {
            category: "Billing".into(),
            action: Some("upgrade".into()),
            label: "NA".into(),
            value: Some(json!(3)),
        }
    );
    assert_eq!(hits[1].dimensions().get("cd1"), Some(&json!("gold")));
    assert_eq!(hits[1].dimensions().get("cd2"), Some(&json!("false")));
}

#[test]
fn missing_tracking_id_prevents_construction() {
    let err = google_analytics(TrackingConfig::from_json("{}").unwrap()).unwrap_err();
    assert_eq!(err.code_str(), "analytics/configuration");
}

#[test]
fn hits_reach_the_collect_endpoint() {
    let server = MockServer::start();
    let page = server.mock(|when, then| {
        when.method(POST)
            .path("/collect")
            .body_contains("tid=UA-555-2")
            .body_contains("uid=u-17")
            .body_contains("t=pageview");
        then.status(200);
    });
    let event = server.mock(|when, then| {
        when.method(POST)
            .path("/collect")
            .body_contains("t=event")
            .body_contains("ec=All")
            .body_contains("ea=signup")
            .body_contains("el=NA")
            .body_contains("cd3=0");
        then.status(200);
    });

    let analytics = GoogleAnalytics::with_measurement_protocol(
        TrackingConfig::new("UA-555-2").with_custom_dimension("seats", "dimension3"),
        MeasurementProtocolConfig::new()
            .with_endpoint(MeasurementProtocolEndpoint::Custom(server.url("/collect"))),
    )
    .unwrap();

    analytics.identify(Some("u-17"));
    analytics
        .page(
            &PluginCall::from_json(
                r#"{"payload":{"properties":{"path":"/","href":"https://x.test/","title":"Home"}}}"#,
            )
            .unwrap(),
        )
        .unwrap();
    analytics
        .track(&PluginCall::from_json(r#"{"payload":{"event":"signup","properties":{"seats":0}}}"#).unwrap())
        .unwrap();
    analytics.shutdown();

    page.assert();
    event.assert();
}
