use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::gate::ManualVerdict;
use anyhow::{anyhow, Result};

/// Handle the verify action: the manual re-entry path.
pub fn handle(action: Action, globals: &GlobalArgs) -> Result<ManualVerdict> {
    let Action::Verify { email } = action else {
        return Err(anyhow!("unexpected action"));
    };

    let gate = super::load_gate(globals)?;
    let verdict = gate.verify(&email)?;

    match &verdict {
        ManualVerdict::Invalid => {
            println!("please enter a valid email address");
        }
        ManualVerdict::Unauthorized { email } => {
            println!("{email} is not authorized to access this content");
            println!("contact the administrator to be added to the allowlist");
        }
        ManualVerdict::Accepted { email, persisted } => {
            println!("email verified: {email}");
            if *persisted {
                println!("session stored; the next `pordego gate` run will grant access automatically");
            } else {
                println!("session persistence is disabled; access applies to this check only");
            }
        }
    }

    Ok(verdict)
}
