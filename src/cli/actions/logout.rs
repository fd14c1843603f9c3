use crate::cli::globals::GlobalArgs;
use crate::gate::session::SessionStore;

/// Handle the logout action: fire-and-forget session delete.
///
/// Only touches the session store, so a missing policy file does not block
/// signing out.
pub fn handle(globals: &GlobalArgs) {
    let store = SessionStore::new(&globals.state_dir);
    store.clear();
    println!("signed out; stored session cleared");
}
