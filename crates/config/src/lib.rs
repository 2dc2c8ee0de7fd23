//! Configuration loading for skillkit.
//!
//! Config file: `skillkit.toml`, searched in `./` then `~/.config/skillkit/`.
//! Supports `${ENV_VAR}` substitution and `~` expansion in paths.

pub mod loader;
pub mod paths;
pub mod schema;

pub use {
    loader::{config_dir, discover_and_load, load_config, resolve_skills_dir},
    paths::{expand_home, home_dir},
    schema::{DEFAULT_FALLBACK_DIR, DEFAULT_PRIMARY_DIR, InstallConfig, SkillkitConfig},
};
