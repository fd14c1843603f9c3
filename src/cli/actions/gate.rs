use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::gate::{
    observer::TraceObserver,
    policy,
    resolver::DetectionSources,
    session::SessionStore,
    Gate, Verdict,
};
use anyhow::{anyhow, Context, Result};
use std::collections::BTreeMap;
use std::fs;
use url::Url;

/// Handle the gate action: run the decision procedure once.
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<Verdict> {
    let Action::Gate {
        url,
        storage,
        cookies,
        no_auto_detect,
    } = action
    else {
        return Err(anyhow!("unexpected action"));
    };

    let (policy, mut settings) = policy::load(&globals.policy_path)?;
    if no_auto_detect {
        settings.auto_detect = false;
    }
    let gate = Gate::new(policy, settings, SessionStore::new(&globals.state_dir));

    let mut sources = DetectionSources::new();
    if let Some(raw) = url {
        let parsed = Url::parse(&raw).with_context(|| format!("invalid page URL: {raw}"))?;
        sources = sources.with_page_url(parsed);
    }
    if let Some(path) = storage {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read storage snapshot {}", path.display()))?;
        let entries: BTreeMap<String, String> = serde_json::from_str(&raw).with_context(|| {
            format!(
                "storage snapshot {} is not a JSON object of strings",
                path.display()
            )
        })?;
        sources = sources.with_storage(entries);
    }
    if let Some(header) = cookies {
        sources = sources.with_cookie_header(&header);
    }

    let outcome = gate.run(&sources, &TraceObserver).await;

    match &outcome.verdict {
        Verdict::Granted(identity) => {
            println!(
                "access granted: {} (via {})",
                identity.email,
                identity.source.method_name()
            );
            println!("session: {}", gate.persistence_description());
            if let Some(cleaned) = &outcome.cleaned_url {
                println!("clean url: {cleaned}");
            }
        }
        Verdict::Denied(Some(email)) => {
            println!("access denied: detected {email} (not authorized)");
            println!("run `pordego verify <EMAIL>` to request access with another address");
        }
        Verdict::Denied(None) => {
            println!("access denied: no email detected automatically");
            println!("run `pordego verify <EMAIL>` to enter an address manually");
        }
    }

    Ok(outcome.verdict)
}
