//! Authorization policy: the static allowlists and the gate settings.
//!
//! The policy document is a JSON file shipped alongside the gated content.
//! It is loaded once and immutable afterwards; the resolver and authorizer
//! receive it by reference instead of reading ambient global state.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use super::email::normalize_email;

const DEFAULT_SESSION_DURATION_SECS: u64 = 7 * 24 * 60 * 60;
const DEFAULT_AUTO_DETECT_TIMEOUT_MS: u64 = 2_000;
const DEFAULT_AUTO_DETECT_DELAY_MS: u64 = 1_000;

/// On-disk shape of the policy document.
#[derive(Debug, Deserialize)]
struct PolicyFile {
    #[serde(default)]
    authorized_emails: Vec<String>,
    #[serde(default)]
    allowed_domains: Vec<String>,
    #[serde(default = "default_true")]
    persist_session: bool,
    #[serde(default = "default_session_duration_secs")]
    session_duration_secs: u64,
    #[serde(default = "default_true")]
    auto_detect: bool,
    #[serde(default = "default_auto_detect_timeout_ms")]
    auto_detect_timeout_ms: u64,
    #[serde(default = "default_auto_detect_delay_ms")]
    auto_detect_delay_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_session_duration_secs() -> u64 {
    DEFAULT_SESSION_DURATION_SECS
}

fn default_auto_detect_timeout_ms() -> u64 {
    DEFAULT_AUTO_DETECT_TIMEOUT_MS
}

fn default_auto_detect_delay_ms() -> u64 {
    DEFAULT_AUTO_DETECT_DELAY_MS
}

/// Static allowlists, lowercased on construction.
#[derive(Debug, Clone)]
pub struct AuthorizationPolicy {
    authorized_emails: HashSet<String>,
    allowed_domains: HashSet<String>,
    // document order, for magic links and the corporate-host fallback
    ordered_emails: Vec<String>,
}

impl AuthorizationPolicy {
    pub fn new<E, D>(emails: E, domains: D) -> Self
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        let mut authorized_emails = HashSet::new();
        let mut ordered_emails = Vec::new();
        for email in emails {
            let normalized = normalize_email(email.as_ref());
            if normalized.is_empty() {
                continue;
            }
            if authorized_emails.insert(normalized.clone()) {
                ordered_emails.push(normalized);
            }
        }
        let allowed_domains = domains
            .into_iter()
            .map(|domain| domain.as_ref().trim().to_lowercase())
            .filter(|domain| !domain.is_empty())
            .collect();
        Self {
            authorized_emails,
            allowed_domains,
            ordered_emails,
        }
    }

    /// Exact address match, or exact match on the domain after the last `@`.
    ///
    /// Pure and total: malformed input (no `@`) evaluates to false.
    #[must_use]
    pub fn is_authorized(&self, email: &str) -> bool {
        let email = normalize_email(email);
        if self.authorized_emails.contains(&email) {
            return true;
        }
        match email.rsplit_once('@') {
            Some((_, domain)) if !domain.is_empty() => self.allowed_domains.contains(domain),
            _ => false,
        }
    }

    /// Authorized addresses in document order.
    #[must_use]
    pub fn authorized_emails(&self) -> &[String] {
        &self.ordered_emails
    }

    #[must_use]
    pub fn first_authorized(&self) -> Option<&str> {
        self.ordered_emails.first().map(String::as_str)
    }
}

/// Knobs recovered from the original gate configuration.
#[derive(Debug, Clone, Copy)]
pub struct GateSettings {
    /// Remember the resolved email across invocations.
    pub persist_session: bool,
    pub session_duration: Duration,
    /// Heuristic auto-detection treats any ambient value shaped like an
    /// email as an identity signal; turn this off to require an explicit
    /// source.
    pub auto_detect: bool,
    pub auto_detect_timeout: Duration,
    /// Simulated deliberation pause before the ambient scan.
    pub auto_detect_delay: Duration,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            persist_session: true,
            session_duration: Duration::from_secs(DEFAULT_SESSION_DURATION_SECS),
            auto_detect: true,
            auto_detect_timeout: Duration::from_millis(DEFAULT_AUTO_DETECT_TIMEOUT_MS),
            auto_detect_delay: Duration::from_millis(DEFAULT_AUTO_DETECT_DELAY_MS),
        }
    }
}

/// Load the policy document and settings from a JSON file.
pub fn load(path: &Path) -> Result<(AuthorizationPolicy, GateSettings)> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read policy file {}", path.display()))?;
    let file: PolicyFile = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse policy file {}", path.display()))?;

    let policy = AuthorizationPolicy::new(&file.authorized_emails, &file.allowed_domains);
    let settings = GateSettings {
        persist_session: file.persist_session,
        session_duration: Duration::from_secs(file.session_duration_secs),
        auto_detect: file.auto_detect,
        auto_detect_timeout: Duration::from_millis(file.auto_detect_timeout_ms),
        auto_detect_delay: Duration::from_millis(file.auto_detect_delay_ms),
    };
    Ok((policy, settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use uuid::Uuid;

    fn policy() -> AuthorizationPolicy {
        AuthorizationPolicy::new(
            ["admin@yourcompany.com", "User@YourCompany.com"],
            ["yourcompany.com", "Partner-Company.com"],
        )
    }

    #[test]
    fn authorized_email_matches_any_case() {
        let policy = policy();
        assert!(policy.is_authorized("admin@yourcompany.com"));
        assert!(policy.is_authorized("ADMIN@YOURCOMPANY.COM"));
        assert!(policy.is_authorized(" Admin@YourCompany.Com "));
    }

    #[test]
    fn allowed_domain_matches_any_local_part() {
        let policy = policy();
        assert!(policy.is_authorized("anyone@yourcompany.com"));
        assert!(policy.is_authorized("other@partner-company.com"));
    }

    #[test]
    fn domain_match_is_exact() {
        let policy = policy();
        assert!(!policy.is_authorized("user@sub.yourcompany.com"));
        assert!(!policy.is_authorized("user@yourcompany.com.evil.com"));
    }

    #[test]
    fn outside_both_lists_is_denied() {
        let policy = policy();
        assert!(!policy.is_authorized("stranger@elsewhere.com"));
    }

    #[test]
    fn malformed_input_is_denied_without_panic() {
        let policy = policy();
        assert!(!policy.is_authorized("no-at-sign"));
        assert!(!policy.is_authorized(""));
        assert!(!policy.is_authorized("@"));
        assert!(!policy.is_authorized("trailing@"));
    }

    #[test]
    fn domain_after_last_at_is_used() {
        let policy = policy();
        // odd but shape-tolerant: the domain is whatever follows the last `@`
        assert!(policy.is_authorized("weird@local@yourcompany.com"));
    }

    #[test]
    fn authorized_emails_keep_document_order() {
        let policy = AuthorizationPolicy::new(["b@x.com", "a@x.com", "b@x.com"], Vec::<String>::new());
        assert_eq!(policy.authorized_emails(), ["b@x.com", "a@x.com"]);
        assert_eq!(policy.first_authorized(), Some("b@x.com"));
    }

    #[test]
    fn load_reads_lists_and_settings() {
        let path = std::env::temp_dir().join(format!("pordego-policy-{}.json", Uuid::new_v4()));
        fs::write(
            &path,
            r#"{
                "authorized_emails": ["Admin@YourCompany.com"],
                "allowed_domains": ["partner-company.com"],
                "persist_session": false,
                "session_duration_secs": 60,
                "auto_detect": false,
                "auto_detect_timeout_ms": 100,
                "auto_detect_delay_ms": 0
            }"#,
        )
        .unwrap();

        let (policy, settings) = load(&path).unwrap();
        fs::remove_file(&path).ok();

        assert!(policy.is_authorized("admin@yourcompany.com"));
        assert!(policy.is_authorized("x@partner-company.com"));
        assert!(!settings.persist_session);
        assert!(!settings.auto_detect);
        assert_eq!(settings.session_duration, Duration::from_secs(60));
        assert_eq!(settings.auto_detect_timeout, Duration::from_millis(100));
        assert_eq!(settings.auto_detect_delay, Duration::ZERO);
    }

    #[test]
    fn load_applies_defaults_for_missing_fields() {
        let path = std::env::temp_dir().join(format!("pordego-policy-{}.json", Uuid::new_v4()));
        fs::write(&path, r#"{"authorized_emails": ["a@b.co"]}"#).unwrap();

        let (policy, settings) = load(&path).unwrap();
        fs::remove_file(&path).ok();

        assert!(policy.is_authorized("a@b.co"));
        assert!(settings.persist_session);
        assert!(settings.auto_detect);
        assert_eq!(settings.session_duration, Duration::from_secs(7 * 24 * 60 * 60));
    }

    #[test]
    fn load_rejects_unreadable_or_invalid_files() {
        let missing = std::env::temp_dir().join(format!("pordego-missing-{}.json", Uuid::new_v4()));
        assert!(load(&missing).is_err());

        let path = std::env::temp_dir().join(format!("pordego-policy-{}.json", Uuid::new_v4()));
        fs::write(&path, "not json").unwrap();
        let result = load(&path);
        fs::remove_file(&path).ok();
        assert!(result.is_err());
    }
}
