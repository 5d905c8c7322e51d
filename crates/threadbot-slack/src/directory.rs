use std::sync::Arc;

use dashmap::DashMap;
use tracing::warn;

use crate::api::SlackApi;

/// User-id to display-name lookup with a process-lifetime cache.
///
/// Entries are never invalidated. Two concurrent misses for the same id may
/// both call `users.info`; the later insert wins, and both resolve the same name.
pub struct UserDirectory {
    api: Arc<dyn SlackApi>,
    names: DashMap<String, String>,
}

impl UserDirectory {
    pub fn new(api: Arc<dyn SlackApi>) -> Self {
        Self {
            api,
            names: DashMap::new(),
        }
    }

    /// Display name for `user_id`. Lookup failures fall back to the id
    /// itself and are not cached, so a later call may still succeed.
    pub async fn display_name(&self, user_id: &str) -> String {
        if let Some(name) = self.names.get(user_id) {
            return name.value().clone();
        }

        match self.api.user_info(user_id).await {
            Ok(user) => {
                let name = user.preferred_name();
                self.names.insert(user_id.to_string(), name.clone());
                name
            }
            Err(e) => {
                warn!(user_id, error = %e, "user lookup failed");
                user_id.to_string()
            }
        }
    }

    pub fn cached(&self) -> usize {
        self.names.len()
    }
}
