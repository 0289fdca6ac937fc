//! Fully resolved Measurement Protocol (v1) hits.

use serde_json::Value;
use url::form_urlencoded;

use crate::analytics::constants::{PROTOCOL_VERSION, USER_ID_FIELD};
use crate::analytics::dimensions::Dimensions;
use crate::analytics::error::{invalid_argument, AnalyticsResult};
use crate::analytics::session::TrackingSession;

#[derive(Clone, Debug, PartialEq)]
pub enum HitKind {
    PageView {
        path: String,
        href: String,
        title: String,
    },
    Event {
        category: String,
        action: Option<String>,
        label: String,
        value: Option<Value>,
    },
}

impl HitKind {
    /// The protocol's `t` parameter.
    pub fn hit_type(&self) -> &'static str {
        match self {
            HitKind::PageView { .. } => "pageview",
            HitKind::Event { .. } => "event",
        }
    }
}

/// One page view or event, with the session identity captured at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Hit {
    tracking_id: String,
    client_id: String,
    user_id: Option<String>,
    kind: HitKind,
    dimensions: Dimensions,
}

impl Hit {
    pub fn new(tracking_id: impl Into<String>, session: &TrackingSession, kind: HitKind) -> Self {
        Self {
            tracking_id: tracking_id.into(),
            client_id: session.client_id().to_string(),
            user_id: session.user_id().map(str::to_string),
            kind,
            dimensions: Dimensions::new(),
        }
    }

    pub fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn tracking_id(&self) -> &str {
        &self.tracking_id
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn kind(&self) -> &HitKind {
        &self.kind
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    /// Checks the backend's own requirement that event hits carry both a category and an action.
    pub fn validate(&self) -> AnalyticsResult<()> {
        if let HitKind::Event {
            category, action, ..
        } = &self.kind
        {
            let has_action = action.as_deref().is_some_and(|a| !a.is_empty());
            if category.is_empty() || !has_action {
                return Err(invalid_argument(
                    "Please provide at least an event category (ec) and an event action (ea)",
                ));
            }
        }
        Ok(())
    }

    /// Protocol parameters in send order: envelope, hit fields, then dimensions.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("v".to_string(), PROTOCOL_VERSION.to_string()),
            ("tid".to_string(), self.tracking_id.clone()),
            ("cid".to_string(), self.client_id.clone()),
        ];
        if let Some(user_id) = &self.user_id {
            params.push((USER_ID_FIELD.to_string(), user_id.clone()));
        }
        params.push(("t".to_string(), self.kind.hit_type().to_string()));

        match &self.kind {
            HitKind::PageView { path, href, title } => {
                params.push(("dp".to_string(), path.clone()));
                params.push(("dl".to_string(), href.clone()));
                params.push(("dt".to_string(), title.clone()));
            }
            HitKind::Event {
                category,
                action,
                label,
                value,
            } => {
                params.push(("ec".to_string(), category.clone()));
                if let Some(action) = action {
                    params.push(("ea".to_string(), action.clone()));
                }
                params.push(("el".to_string(), label.clone()));
                if let Some(value) = value.as_ref().and_then(param_value) {
                    params.push(("ev".to_string(), value));
                }
            }
        }

        params.extend(
            self.dimensions
                .iter()
                .filter_map(|(code, value)| param_value(value).map(|v| (code.clone(), v))),
        );
        params
    }

    /// `application/x-www-form-urlencoded` request body.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.to_params())
            .finish()
    }
}

fn param_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session() -> TrackingSession {
        TrackingSession::with_client_id("35009a79-1a05-49d7-b876-2b884d0f825b")
    }

    #[test]
    fn page_view_params() {
        let hit = Hit::new(
            "UA-1-1",
            &session(),
            HitKind::PageView {
                path: "/docs".into(),
                href: "https://example.com/docs".into(),
                title: "Docs".into(),
            },
        );
        assert_eq!(
            hit.encode(),
            "v=1&tid=UA-1-1&cid=35009a79-1a05-49d7-b876-2b884d0f825b&t=pageview&dp=%2Fdocs\
             &dl=https%3A%2F%2Fexample.com%2Fdocs&dt=Docs"
        );
        hit.validate().unwrap();
    }

    #[test]
    fn event_params_include_user_and_dimensions() {
        let mut session = session();
        session.set_user_id(Some("user 7".into()));
        let hit = Hit::new(
            "UA-1-1",
            &session,
            HitKind::Event {
                category: "All".into(),
                action: Some("signup".into()),
                label: "NA".into(),
                value: Some(json!(3)),
            },
        )
        .with_dimensions(Dimensions::from([
            ("cd1".to_string(), json!("pro")),
            ("cd2".to_string(), json!(0)),
        ]));

        let params = hit.to_params();
        let keys: Vec<_> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            ["v", "tid", "cid", "uid", "t", "ec", "ea", "el", "ev", "cd1", "cd2"]
        );
        assert!(hit.encode().contains("uid=user+7"));
        assert!(hit.encode().contains("cd2=0"));
        hit.validate().unwrap();
    }

    #[test]
    fn identity_is_snapshotted_at_construction() {
        let mut session = session();
        session.set_user_id(Some("before".into()));
        let hit = Hit::new(
            "UA-1-1",
            &session,
            HitKind::PageView {
                path: "/".into(),
                href: "https://example.com/".into(),
                title: "Home".into(),
            },
        );
        session.set_user_id(Some("after".into()));
        assert_eq!(hit.user_id(), Some("before"));
    }

    #[test]
    fn event_without_action_is_invalid() {
        let hit = Hit::new(
            "UA-1-1",
            &session(),
            HitKind::Event {
                category: "All".into(),
                action: None,
                label: "NA".into(),
                value: None,
            },
        );
        let err = hit.validate().unwrap_err();
        assert_eq!(err.code_str(), "analytics/invalid-argument");
        assert!(!hit.encode().contains("ea="));
    }
}
