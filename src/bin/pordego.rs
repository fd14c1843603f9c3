use anyhow::Result;
use pordego::cli::{actions, actions::Action, start};
use pordego::gate::{ManualVerdict, Verdict};
use std::process::ExitCode;

// Main function
#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Start the program
    let (action, globals) = start()?;

    // Handle the action; denial maps to a failing exit code
    let code = match action {
        Action::Gate { .. } => match actions::gate::handle(action, &globals).await? {
            Verdict::Granted(_) => ExitCode::SUCCESS,
            Verdict::Denied(_) => ExitCode::FAILURE,
        },
        Action::Verify { .. } => match actions::verify::handle(action, &globals)? {
            ManualVerdict::Accepted { .. } => ExitCode::SUCCESS,
            ManualVerdict::Invalid | ManualVerdict::Unauthorized { .. } => ExitCode::FAILURE,
        },
        Action::Links { .. } => {
            actions::links::handle(action, &globals)?;
            ExitCode::SUCCESS
        }
        Action::Logout => {
            actions::logout::handle(&globals);
            ExitCode::SUCCESS
        }
    };

    Ok(code)
}
