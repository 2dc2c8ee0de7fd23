//! Config schema types for skill discovery and installation.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Per-tool install location, used when it exists or when nothing exists yet.
pub const DEFAULT_PRIMARY_DIR: &str = "~/.claude/skills";

/// Shared install location, used when only it exists.
pub const DEFAULT_FALLBACK_DIR: &str = "~/.agents/skills";

/// Root configuration, read from `skillkit.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SkillkitConfig {
    /// Directory holding one subdirectory per skill.
    pub skills_dir: Option<PathBuf>,
    pub install: InstallConfig,
}

/// Where `install` and `install-all` copy skills to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallConfig {
    /// Preferred global location. Created when neither location exists.
    pub primary: Option<PathBuf>,
    /// Checked only when `primary` is not an existing directory.
    pub fallback: Option<PathBuf>,
    /// Always install here, bypassing the primary/fallback lookup.
    pub target: Option<PathBuf>,
}

impl InstallConfig {
    /// Primary location with `~` expanded, falling back to the built-in default.
    pub fn primary_dir(&self) -> PathBuf {
        crate::paths::expand_home(
            self.primary
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PRIMARY_DIR)),
        )
    }

    /// Fallback location with `~` expanded, falling back to the built-in default.
    pub fn fallback_dir(&self) -> PathBuf {
        crate::paths::expand_home(
            self.fallback
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FALLBACK_DIR)),
        )
    }

    pub fn target_dir(&self) -> Option<PathBuf> {
        self.target.clone().map(crate::paths::expand_home)
    }
}
