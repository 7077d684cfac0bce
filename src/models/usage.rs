use serde::Serialize;

/// Who a request is counted against, in precedence order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    User(String),
    Session(String),
    Ip(String),
    Anonymous,
}

impl Identity {
    /// Storage key fragment for this identity.
    pub fn key(&self) -> String {
        match self {
            Identity::User(id) => format!("user:{}", id),
            Identity::Session(id) => format!("session:{}", id),
            Identity::Ip(addr) => format!("ip:{}", addr),
            Identity::Anonymous => "anonymous".to_string(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::User(_))
    }
}

/// Wire shape for usage-limit checks and 429 denials
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageLimit {
    pub can_translate: bool,
    pub remaining_translations: i64,
    pub is_authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_keys() {
        assert_eq!(Identity::User("u1".to_string()).key(), "user:u1");
        assert_eq!(Identity::Session("s1".to_string()).key(), "session:s1");
        assert_eq!(Identity::Ip("9.9.9.9".to_string()).key(), "ip:9.9.9.9");
        assert_eq!(Identity::Anonymous.key(), "anonymous");
    }

    #[test]
    fn test_usage_limit_wire_shape() {
        let limit = UsageLimit {
            can_translate: true,
            remaining_translations: 2,
            is_authenticated: false,
            limit_message: None,
        };
        let json = serde_json::to_string(&limit).expect("serialize failed");
        assert!(json.contains("\"canTranslate\":true"));
        assert!(json.contains("\"remainingTranslations\":2"));
        assert!(!json.contains("limitMessage"));
    }
}
