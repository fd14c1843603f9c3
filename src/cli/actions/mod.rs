pub mod gate;
pub mod links;
pub mod logout;
pub mod verify;

use crate::cli::globals::GlobalArgs;
use crate::gate::{policy, session::SessionStore, Gate};
use anyhow::Result;
use std::path::PathBuf;

/// Actions the CLI can dispatch.
#[derive(Debug)]
pub enum Action {
    Gate {
        url: Option<String>,
        storage: Option<PathBuf>,
        cookies: Option<String>,
        no_auto_detect: bool,
    },
    Verify {
        email: String,
    },
    Links {
        base_url: String,
    },
    Logout,
}

/// Build a [`Gate`] from the shared arguments.
pub(crate) fn load_gate(globals: &GlobalArgs) -> Result<Gate> {
    let (policy, settings) = policy::load(&globals.policy_path)?;
    let store = SessionStore::new(&globals.state_dir);
    Ok(Gate::new(policy, settings, store))
}
