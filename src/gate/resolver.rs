//! Detection strategies and the ordered resolver combinator.
//!
//! Detection is an explicit strategy list walked in priority order: the
//! magic-link URL parameter, then the stored session, then the heuristic
//! ambient scan. Each strategy probes its sources for shape-valid candidate
//! emails; the combinator returns the first authorized candidate and
//! remembers the first valid-but-unauthorized one for display.

use std::collections::BTreeMap;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};
use url::Url;

use super::email::{normalize_email, valid_email};
use super::observer::{DetectStep, GateObserver, StepStatus};
use super::policy::{AuthorizationPolicy, GateSettings};
use super::session::{now_unix, SessionStore};

/// Query parameter magic links ride on.
pub const EMAIL_PARAM: &str = "email";

/// Provenance of a resolved identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    UrlParameter,
    StoredSession,
    AutoDetected,
}

impl Source {
    /// Human-readable method name for the presentation layer.
    #[must_use]
    pub const fn method_name(self) -> &'static str {
        match self {
            Self::UrlParameter => "Magic Link",
            Self::StoredSession => "Stored Session",
            Self::AutoDetected => "Auto-Detection",
        }
    }

    const fn step(self) -> DetectStep {
        match self {
            Self::UrlParameter => DetectStep::UrlParameter,
            Self::StoredSession => DetectStep::StoredSession,
            Self::AutoDetected => DetectStep::AutoDetect,
        }
    }
}

/// The email address and provenance selected for this invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    /// Lowercase-normalized address.
    pub email: String,
    pub source: Source,
}

/// Everything a page load would have had available for detection.
#[derive(Debug, Clone, Default)]
pub struct DetectionSources {
    /// The visited URL; magic links carry the email in its query string.
    pub page_url: Option<Url>,
    /// Ambient key/value snapshot (the local-storage analog).
    pub storage: BTreeMap<String, String>,
    /// Cookie pairs in header order.
    pub cookies: Vec<(String, String)>,
}

impl DetectionSources {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_page_url(mut self, url: Url) -> Self {
        self.page_url = Some(url);
        self
    }

    #[must_use]
    pub fn with_storage(mut self, storage: BTreeMap<String, String>) -> Self {
        self.storage = storage;
        self
    }

    #[must_use]
    pub fn with_cookie_header(mut self, header: &str) -> Self {
        self.cookies = parse_cookie_header(header);
        self
    }
}

/// Parse a raw `name=value; name2=value2` cookie header into pairs.
#[must_use]
pub fn parse_cookie_header(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|pair| {
            let trimmed = pair.trim();
            let mut parts = trimmed.splitn(2, '=');
            let key = parts.next()?.trim();
            let value = parts.next()?.trim();
            if key.is_empty() || value.is_empty() {
                return None;
            }
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Outcome of the detection step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// First authorized hit, if any strategy produced one.
    pub identity: Option<ResolvedIdentity>,
    /// First shape-valid but unauthorized candidate, kept for display only.
    pub rejected: Option<String>,
}

const STRATEGIES: [Source; 3] = [Source::UrlParameter, Source::StoredSession, Source::AutoDetected];

pub struct Resolver<'a> {
    policy: &'a AuthorizationPolicy,
    settings: GateSettings,
    store: &'a SessionStore,
}

impl<'a> Resolver<'a> {
    #[must_use]
    pub fn new(policy: &'a AuthorizationPolicy, settings: GateSettings, store: &'a SessionStore) -> Self {
        Self {
            policy,
            settings,
            store,
        }
    }

    /// Walk the strategy list in priority order.
    ///
    /// A strategy is consulted only when every higher-priority strategy
    /// failed to produce an authorized match. All strategies failing is an
    /// undetermined identity, not an error.
    pub async fn resolve(&self, sources: &DetectionSources, observer: &dyn GateObserver) -> Resolution {
        let mut resolution = Resolution::default();

        for source in STRATEGIES {
            if source == Source::AutoDetected && !self.settings.auto_detect {
                continue;
            }
            observer.step(source.step(), StepStatus::Active);

            let candidates = self.probe(source, sources).await;
            let mut hit = None;
            for candidate in candidates {
                let email = normalize_email(&candidate);
                if self.policy.is_authorized(&email) {
                    hit = Some(email);
                    break;
                }
                debug!(email = %email, step = %source.step(), "candidate is not authorized");
                if resolution.rejected.is_none() {
                    resolution.rejected = Some(email);
                }
            }

            if let Some(email) = hit {
                observer.step(source.step(), StepStatus::Completed);
                if self.settings.persist_session && source != Source::StoredSession {
                    if let Err(err) = self.store.save(&email, now_unix(), self.settings.session_duration) {
                        warn!("failed to persist session: {err}");
                    }
                }
                resolution.identity = Some(ResolvedIdentity { email, source });
                return resolution;
            }

            // the last-resort heuristic step failing means detection failed
            let status = if source == Source::AutoDetected {
                StepStatus::Failed
            } else {
                StepStatus::Completed
            };
            observer.step(source.step(), status);
        }

        resolution
    }

    async fn probe(&self, source: Source, sources: &DetectionSources) -> Vec<String> {
        match source {
            Source::UrlParameter => probe_url_parameter(sources).into_iter().collect(),
            Source::StoredSession => self.probe_stored_session().into_iter().collect(),
            Source::AutoDetected => self.probe_auto_detect(sources).await,
        }
    }

    fn probe_stored_session(&self) -> Option<String> {
        let session = self.store.load_live(now_unix())?;
        valid_email(&session.email).then_some(session.email)
    }

    /// Heuristic ambient scan, bounded by the configured timeout and
    /// preceded by the simulated deliberation pause.
    async fn probe_auto_detect(&self, sources: &DetectionSources) -> Vec<String> {
        let scan = async {
            sleep(self.settings.auto_detect_delay).await;
            scan_ambient(sources, self.policy)
        };
        match timeout(self.settings.auto_detect_timeout, scan).await {
            Ok(candidates) => candidates,
            Err(_) => {
                debug!("auto-detection timed out");
                Vec::new()
            }
        }
    }
}

fn probe_url_parameter(sources: &DetectionSources) -> Option<String> {
    let url = sources.page_url.as_ref()?;
    let value = url
        .query_pairs()
        .find(|(key, _)| key == EMAIL_PARAM)
        .map(|(_, value)| value.trim().to_string())?;
    valid_email(&value).then_some(value)
}

/// Collect every ambient value shaped like an email: storage values in key
/// order, then cookie values in header order, then the corporate-host demo
/// fallback.
fn scan_ambient(sources: &DetectionSources, policy: &AuthorizationPolicy) -> Vec<String> {
    let mut candidates = Vec::new();
    for value in sources.storage.values() {
        push_if_email(&mut candidates, value);
    }
    for (_, value) in &sources.cookies {
        push_if_email(&mut candidates, value);
    }
    if let Some(host) = sources.page_url.as_ref().and_then(Url::host_str) {
        if host.contains("corp") || host.contains("internal") {
            if let Some(email) = policy.first_authorized() {
                debug!(host, "corporate host detected, suggesting first configured address");
                candidates.push(email.to_string());
            }
        }
    }
    candidates
}

fn push_if_email(candidates: &mut Vec<String>, value: &str) {
    let trimmed = value.trim();
    if valid_email(trimmed) {
        candidates.push(trimmed.to_string());
    }
}
