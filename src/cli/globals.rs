use std::path::PathBuf;

/// Arguments shared by every action.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub policy_path: PathBuf,
    pub state_dir: PathBuf,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(policy_path: PathBuf, state_dir: PathBuf) -> Self {
        Self {
            policy_path,
            state_dir,
        }
    }
}
