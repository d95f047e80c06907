//! Configuration system
//!
//! - `macros`: the `config_struct!` declaration macro
//! - `schemas`: every config section with its defaults
//! - `utils`: loading, environment overrides and global access

mod macros;
pub mod schemas;
pub mod utils;

pub use schemas::{ApiConfig, Config, TelegramConfig, TrackingConfig};
pub use utils::{
    load_config_from_path, parse_config, with_config,
    CONFIG_FILE_PATH, TOKEN_ENV_VAR,
};
