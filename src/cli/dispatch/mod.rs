use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::{anyhow, Result};
use std::path::PathBuf;

pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let globals = GlobalArgs {
        policy_path: matches
            .get_one::<PathBuf>("policy")
            .cloned()
            .ok_or_else(|| anyhow!("missing required argument: --policy"))?,
        state_dir: matches
            .get_one::<PathBuf>("state-dir")
            .cloned()
            .unwrap_or_else(|| PathBuf::from(".pordego")),
    };

    let action = match matches.subcommand() {
        Some(("gate", sub)) => Action::Gate {
            url: sub.get_one::<String>("url").cloned(),
            storage: sub.get_one::<PathBuf>("storage").cloned(),
            cookies: sub.get_one::<String>("cookies").cloned(),
            no_auto_detect: sub.get_flag("no-auto-detect"),
        },
        Some(("verify", sub)) => Action::Verify {
            email: sub
                .get_one::<String>("email")
                .cloned()
                .ok_or_else(|| anyhow!("missing required argument: <email>"))?,
        },
        Some(("links", sub)) => Action::Links {
            base_url: sub
                .get_one::<String>("base-url")
                .cloned()
                .ok_or_else(|| anyhow!("missing required argument: --base-url"))?,
        },
        Some(("logout", _)) => Action::Logout,
        _ => return Err(anyhow!("missing subcommand")),
    };

    Ok((action, globals))
}
