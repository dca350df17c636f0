//! Configuration system
//!
//! One immutable [`Config`] is built at startup from, in increasing priority:
//! built-in defaults, an optional TOML file, a `.env` file, the process
//! environment and command-line flags. It is then shared read-only through the
//! webserver state.

mod macros;
mod schemas;
mod utils;

pub use schemas::{Config, RunnerConfig, WebserverConfig};
pub use utils::{
    apply_arg_overrides, apply_env_overrides, load_config, load_dotenv, read_config_file,
    validate_config, ConfigOverrides, DEFAULT_CONFIG_PATH, ENV_HOST, ENV_MODEL, ENV_PORT,
    ENV_RUNNER,
};
