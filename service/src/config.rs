//! Sign-up configuration.
//!
//! Values come from the application (see the server's environment
//! configuration), never from constants inside operations.

use chrono::Duration;

/// Tunables for sign-up operations.
#[derive(Debug, Clone)]
pub struct SignupConfig {
    /// Public base URL, used to build admin links.
    ///
    /// Admin links are formatted as `{base_url}/event/{id}/admin?token={token}`.
    pub base_url: String,

    /// Verification code lifetime in minutes.
    ///
    /// Default: 15 minutes
    pub code_ttl_minutes: i64,

    /// Days until a new event's `expires_at`.
    ///
    /// Default: 30 days
    pub event_ttl_days: i64,

    /// Join code generation attempts before giving up on collisions.
    ///
    /// Default: 5
    pub join_code_attempts: u32,
}

impl SignupConfig {
    /// Create configuration for `base_url` with default tunables.
    #[must_use]
    pub const fn new(base_url: String) -> Self {
        Self {
            base_url,
            code_ttl_minutes: 15,
            event_ttl_days: 30,
            join_code_attempts: 5,
        }
    }

    /// Set verification code lifetime.
    #[must_use]
    pub const fn with_code_ttl(mut self, minutes: i64) -> Self {
        self.code_ttl_minutes = minutes;
        self
    }

    /// Set event lifetime.
    #[must_use]
    pub const fn with_event_ttl(mut self, days: i64) -> Self {
        self.event_ttl_days = days;
        self
    }

    /// Set join code attempts (at least one is always made).
    #[must_use]
    pub const fn with_join_code_attempts(mut self, attempts: u32) -> Self {
        self.join_code_attempts = attempts;
        self
    }

    /// Verification code lifetime.
    #[must_use]
    pub const fn code_ttl(&self) -> Duration {
        Duration::minutes(self.code_ttl_minutes)
    }

    /// Event lifetime.
    #[must_use]
    pub const fn event_ttl(&self) -> Duration {
        Duration::days(self.event_ttl_days)
    }

    /// Admin link for an event.
    #[must_use]
    pub fn admin_url(&self, event_id: impl std::fmt::Display, token: &str) -> String {
        format!(
            "{}/event/{event_id}/admin?token={token}",
            self.base_url.trim_end_matches('/')
        )
    }
}

impl Default for SignupConfig {
    fn default() -> Self {
        Self::new("http://localhost:3000".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SignupConfig::default();
        assert_eq!(config.code_ttl(), Duration::minutes(15));
        assert_eq!(config.event_ttl(), Duration::days(30));
        assert_eq!(config.join_code_attempts, 5);
    }

    #[test]
    fn builders() {
        let config = SignupConfig::new("https://signup.example.com/".into())
            .with_code_ttl(5)
            .with_event_ttl(7)
            .with_join_code_attempts(2);
        assert_eq!(config.code_ttl_minutes, 5);
        assert_eq!(config.event_ttl_days, 7);
        assert_eq!(config.join_code_attempts, 2);
        assert_eq!(
            config.admin_url("evt", "tok"),
            "https://signup.example.com/event/evt/admin?token=tok"
        );
    }
}
