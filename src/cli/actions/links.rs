use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::gate::magic::magic_links;
use anyhow::{anyhow, Context, Result};
use url::Url;

/// Handle the links action: print one magic link per authorized address.
pub fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    let Action::Links { base_url } = action else {
        return Err(anyhow!("unexpected action"));
    };

    let base = Url::parse(&base_url).with_context(|| format!("invalid base URL: {base_url}"))?;
    let gate = super::load_gate(globals)?;

    let links = magic_links(gate.policy(), &base);
    if links.is_empty() {
        println!("policy has no authorized emails");
        return Ok(());
    }
    for (email, link) in links {
        println!("{email}\t{link}");
    }

    Ok(())
}
