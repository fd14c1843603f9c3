use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ArgAction, ColorChoice, Command,
};
use std::path::PathBuf;

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("pordego")
        .about("Email-gated access for static content")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("policy")
                .short('c')
                .long("policy")
                .help("Path to the JSON policy document (allowlists and settings)")
                .env("PORDEGO_POLICY")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("state-dir")
                .short('s')
                .long("state-dir")
                .help("Directory holding the persisted session record")
                .env("PORDEGO_STATE_DIR")
                .default_value(".pordego")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("PORDEGO_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .subcommand(
            Command::new("gate")
                .about("Run the detection and authorization procedure once")
                .arg(
                    Arg::new("url")
                        .short('u')
                        .long("url")
                        .help("Visited page URL; magic links carry the email in its query string")
                        .env("PORDEGO_URL"),
                )
                .arg(
                    Arg::new("storage")
                        .long("storage")
                        .help("JSON object file with ambient key/value data to scan")
                        .env("PORDEGO_STORAGE")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("cookies")
                        .long("cookies")
                        .help("Raw cookie header to scan, `name=value; name2=value2`")
                        .env("PORDEGO_COOKIES"),
                )
                .arg(
                    Arg::new("no-auto-detect")
                        .long("no-auto-detect")
                        .help("Disable heuristic auto-detection for this run")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("verify")
                .about("Verify a manually entered email address")
                .arg(
                    Arg::new("email")
                        .help("Email address to verify")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("links")
                .about("Print one magic link per authorized email")
                .arg(
                    Arg::new("base-url")
                        .short('b')
                        .long("base-url")
                        .help("Base URL the entry parameter is appended to")
                        .env("PORDEGO_BASE_URL")
                        .required(true),
                ),
        )
        .subcommand(Command::new("logout").about("Clear the stored session"))
}
