//! The email gate decision core.
//!
//! One invocation runs `Detecting -> Authorizing -> {Granted, Denied}`:
//! the resolver walks the detection strategies, the authorizer checks the
//! resolved identity against the policy, and the observer is notified of
//! every transition. Denial is terminal for the invocation; manual re-entry
//! ([`Gate::verify`]) is a fresh invocation, not a resumption.

pub mod email;
pub mod magic;
pub mod observer;
pub mod policy;
pub mod resolver;
pub mod session;

use url::Url;

use email::{normalize_email, valid_email};
use observer::GateObserver;
use policy::{AuthorizationPolicy, GateSettings};
use resolver::{DetectionSources, ResolvedIdentity, Resolver, Source};
use session::{now_unix, SessionStore};

/// The binary outcome plus any identity retained for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Granted(ResolvedIdentity),
    /// The optional email was detected but is not authorized; it is kept
    /// for display only and never treated as an identity.
    Denied(Option<String>),
}

impl Verdict {
    #[must_use]
    pub const fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }
}

/// Outcome of one manual-entry verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManualVerdict {
    /// Input failed the shape check; silently rejected, no distinct error.
    Invalid,
    /// Authorized; a session was persisted when the policy allows it.
    Accepted { email: String, persisted: bool },
    /// Outside both allowlists. Nothing is persisted.
    Unauthorized { email: String },
}

/// Result of one gate invocation, for the presentation layer.
#[derive(Debug, Clone)]
pub struct GateOutcome {
    pub verdict: Verdict,
    /// The page URL with the entry parameter removed; present only when the
    /// grant rode a magic link.
    pub cleaned_url: Option<Url>,
}

pub struct Gate {
    policy: AuthorizationPolicy,
    settings: GateSettings,
    store: SessionStore,
}

impl Gate {
    #[must_use]
    pub fn new(policy: AuthorizationPolicy, settings: GateSettings, store: SessionStore) -> Self {
        Self {
            policy,
            settings,
            store,
        }
    }

    #[must_use]
    pub fn policy(&self) -> &AuthorizationPolicy {
        &self.policy
    }

    #[must_use]
    pub fn settings(&self) -> GateSettings {
        self.settings
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Run the decision procedure once: detect, authorize, report.
    pub async fn run(&self, sources: &DetectionSources, observer: &dyn GateObserver) -> GateOutcome {
        let resolver = Resolver::new(&self.policy, self.settings, &self.store);
        let resolution = resolver.resolve(sources, observer).await;

        // The resolver only yields authorized hits; re-check anyway so the
        // authorizer contract stands on its own.
        let verdict = match resolution.identity {
            Some(identity) if self.policy.is_authorized(&identity.email) => Verdict::Granted(identity),
            Some(identity) => Verdict::Denied(Some(identity.email)),
            None => Verdict::Denied(resolution.rejected),
        };

        let cleaned_url = match &verdict {
            Verdict::Granted(identity) if identity.source == Source::UrlParameter => {
                sources.page_url.as_ref().map(magic::strip_email_param)
            }
            _ => None,
        };

        observer.verdict(&verdict, self.persistence_description());
        GateOutcome { verdict, cleaned_url }
    }

    /// Manual re-entry path: same shape check, same authorizer.
    ///
    /// On acceptance a session is persisted (when enabled) so the next
    /// invocation resolves automatically without re-prompting.
    pub fn verify(&self, email: &str) -> anyhow::Result<ManualVerdict> {
        let email = normalize_email(email);
        if !valid_email(&email) {
            return Ok(ManualVerdict::Invalid);
        }
        if !self.policy.is_authorized(&email) {
            return Ok(ManualVerdict::Unauthorized { email });
        }

        let persisted = if self.settings.persist_session {
            self.store.save(&email, now_unix(), self.settings.session_duration)?;
            true
        } else {
            false
        };
        Ok(ManualVerdict::Accepted { email, persisted })
    }

    /// Clear the stored session. Fire-and-forget.
    pub fn logout(&self) {
        self.store.clear();
    }

    /// Human-readable session-persistence description for display.
    #[must_use]
    pub fn persistence_description(&self) -> &'static str {
        if self.settings.persist_session {
            "Persistent (you will stay signed in)"
        } else {
            "Temporary (verification required next visit)"
        }
    }
}
