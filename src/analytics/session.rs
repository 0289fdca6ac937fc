use rand::Rng;

/// Identity attached to every hit a dispatcher sends.
///
/// `client_id` is generated once per session and identifies the anonymous visitor; `user_id` is
/// whatever the last `identify` call set. Each dispatcher owns one session, so callers that need
/// isolated identities use one dispatcher per logical user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackingSession {
    client_id: String,
    user_id: Option<String>,
}

impl TrackingSession {
    pub fn new() -> Self {
        Self::with_client_id(generate_client_id())
    }

    pub fn with_client_id(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            user_id: None,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn set_user_id(&mut self, user_id: Option<String>) {
        self.user_id = user_id;
    }
}

impl Default for TrackingSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Random version 4 UUID in its canonical hyphenated form.
fn generate_client_id() -> String {
    let mut bytes: [u8; 16] = rand::thread_rng().gen();
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    let hex: String = bytes.iter().map(|byte| format!("{byte:02x}")).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_ids_are_uuid_v4_shaped() {
        let id = generate_client_id();
        let groups: Vec<_> = id.split('-').map(str::len).collect();
        assert_eq!(groups, [8, 4, 4, 4, 12]);
        assert_eq!(&id[14..15], "4");
        assert!(matches!(&id[19..20], "8" | "9" | "a" | "b"));
    }

    #[test]
    fn sessions_get_distinct_client_ids() {
        assert_ne!(
            TrackingSession::new().client_id(),
            TrackingSession::new().client_id()
        );
    }

    #[test]
    fn user_id_is_last_write_wins() {
        let mut session = TrackingSession::with_client_id("cid");
        assert_eq!(session.user_id(), None);
        session.set_user_id(Some("alice".into()));
        session.set_user_id(Some("bob".into()));
        assert_eq!(session.user_id(), Some("bob"));
        session.set_user_id(None);
        assert_eq!(session.user_id(), None);
    }
}
