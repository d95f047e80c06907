/// Centralized argument handling for the scan bot
///
/// Features:
/// - Centralized CMD_ARGS storage with thread-safe access
/// - Flag and value lookup helpers
/// - Help text
use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

/// Global command-line arguments storage
pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

/// Gets a copy of the current command-line arguments
pub fn get_cmd_args() -> Vec<String> {
    match CMD_ARGS.lock() {
        Ok(args) => args.clone(),
        Err(_) => env::args().collect(),
    }
}

/// Checks if a specific argument is present in the command line
pub fn has_arg(arg: &str) -> bool {
    get_cmd_args().iter().any(|a| a == arg)
}

/// Gets the value of a command-line argument that follows a flag
pub fn get_arg_value(flag: &str) -> Option<String> {
    value_after(&get_cmd_args(), flag)
}

fn value_after(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .filter(|v| !v.starts_with("--"))
        .cloned()
}

pub fn is_help_requested() -> bool {
    has_arg("--help") || has_arg("-h")
}

/// Config file path from --config, if given
pub fn config_path_override() -> Option<String> {
    get_arg_value("--config")
}

pub fn print_help() {
    println!(
        "scanbot - contract address scanner and market cap tracker for Telegram\n\n\
         USAGE:\n    scanbot [OPTIONS]\n\n\
         OPTIONS:\n\
         \x20   --config <path>     Config file (default: data/config.toml)\n\
         \x20   --debug-<module>    Debug logs for a module (telegram, commands, api,\n\
         \x20                       tracker, poller, pins, config, system, all)\n\
         \x20   --verbose           Verbose logs\n\
         \x20   --quiet             Only warnings and errors\n\
         \x20   -h, --help          Show this help\n\n\
         ENVIRONMENT:\n\
         \x20   TELEGRAM_BOT_API_TOKEN   Bot token (overrides telegram.bot_token)"
    );
}
