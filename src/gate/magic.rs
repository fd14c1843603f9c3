//! Magic-link provisioning and URL cleaning.

use url::Url;

use super::policy::AuthorizationPolicy;
use super::resolver::EMAIL_PARAM;

/// One fully-formed entry-parameter URL per authorized address, in policy
/// document order. A provisioning convenience, not part of the decision path.
#[must_use]
pub fn magic_links(policy: &AuthorizationPolicy, base_url: &Url) -> Vec<(String, Url)> {
    policy
        .authorized_emails()
        .iter()
        .map(|email| {
            let mut link = base_url.clone();
            link.query_pairs_mut().append_pair(EMAIL_PARAM, email);
            (email.clone(), link)
        })
        .collect()
}

/// Remove the entry parameter from a visited URL, keeping everything else.
#[must_use]
pub fn strip_email_param(url: &Url) -> Url {
    let remaining: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != EMAIL_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut cleaned = url.clone();
    cleaned.set_query(None);
    if !remaining.is_empty() {
        let mut pairs = cleaned.query_pairs_mut();
        for (key, value) in &remaining {
            pairs.append_pair(key, value);
        }
    }
    cleaned
}
