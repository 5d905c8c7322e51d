use serde::Deserialize;

/// One message returned by `conversations.replies`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ThreadMessage {
    /// Author; absent on some bot and system messages.
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub thread_ts: Option<String>,
}

/// The subset of a `users.info` user object needed for naming.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile: Option<UserProfile>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub real_name: Option<String>,
}

impl UserInfo {
    /// Best human-readable name: profile display name, then real name,
    /// then user name, then the raw id.
    pub fn preferred_name(&self) -> String {
        let non_empty = |s: &Option<String>| s.as_deref().filter(|v| !v.is_empty()).map(String::from);
        self.profile
            .as_ref()
            .and_then(|p| non_empty(&p.display_name).or_else(|| non_empty(&p.real_name)))
            .or_else(|| non_empty(&self.name))
            .unwrap_or_else(|| self.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(display: &str, real: &str, name: &str) -> UserInfo {
        UserInfo {
            id: "U1".into(),
            name: Some(name.into()),
            profile: Some(UserProfile {
                display_name: Some(display.into()),
                real_name: Some(real.into()),
            }),
        }
    }

    #[test]
    fn name_preference_order() {
        assert_eq!(user("Alex", "Alex Kim", "akim").preferred_name(), "Alex");
        assert_eq!(user("", "Alex Kim", "akim").preferred_name(), "Alex Kim");
        assert_eq!(user("", "", "akim").preferred_name(), "akim");
        assert_eq!(user("", "", "").preferred_name(), "U1");
    }

    #[test]
    fn deserializes_users_info_user() {
        let raw = r#"{
            "id": "U2",
            "name": "sam",
            "is_bot": false,
            "profile": {"display_name": "", "real_name": "Sam Lee", "image_48": "x"}
        }"#;
        let u: UserInfo = serde_json::from_str(raw).unwrap();
        assert_eq!(u.preferred_name(), "Sam Lee");
    }
}
