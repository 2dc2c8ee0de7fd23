use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{paths::substitute_env, schema::SkillkitConfig};

/// Config file name, looked up in `./` then in the user config directory.
const CONFIG_FILENAME: &str = "skillkit.toml";

/// Load config from an explicit path. Unlike discovery, a missing or
/// malformed file is an error.
pub fn load_config(path: &Path) -> anyhow::Result<SkillkitConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./skillkit.toml` (project-local)
/// 2. `~/.config/skillkit/skillkit.toml` (user-global)
///
/// Returns `SkillkitConfig::default()` if no config file is found or the one
/// found cannot be parsed.
pub fn discover_and_load() -> SkillkitConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    SkillkitConfig::default()
}

/// Returns the user-global config directory (`~/.config/skillkit/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "skillkit").map(|d| d.config_dir().to_path_buf())
}

fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.is_file() {
        return Some(local);
    }
    config_dir()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .filter(|p| p.is_file())
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<SkillkitConfig> {
    let raw = substitute_env(raw);
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("invalid config {}: {e}", path.display()))
}

/// Resolve the skills root directory.
///
/// Precedence: explicit value (flag or env) → `skills_dir` from config →
/// `skills/` next to the running executable when it exists → `./skills`.
pub fn resolve_skills_dir(explicit: Option<&Path>, config: &SkillkitConfig) -> PathBuf {
    if let Some(dir) = explicit {
        return crate::paths::expand_home(dir);
    }
    if let Some(ref dir) = config.skills_dir {
        return crate::paths::expand_home(dir);
    }
    if let Some(beside_exe) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join("skills")))
        .filter(|p| p.is_dir())
    {
        return beside_exe;
    }
    PathBuf::from("skills")
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_explicit_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("skillkit.toml");
        std::fs::write(&path, "[install]\ntarget = \"/opt/skills\"\n").unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.install.target, Some(PathBuf::from("/opt/skills")));
    }

    #[test]
    fn load_missing_explicit_file_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_config(&tmp.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn load_malformed_file_names_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.toml");
        std::fs::write(&path, "skills_dir = [").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn explicit_skills_dir_wins() {
        let cfg = SkillkitConfig {
            skills_dir: Some(PathBuf::from("/from/config")),
            ..Default::default()
        };
        assert_eq!(
            resolve_skills_dir(Some(Path::new("/from/flag")), &cfg),
            PathBuf::from("/from/flag")
        );
        assert_eq!(
            resolve_skills_dir(None, &cfg),
            PathBuf::from("/from/config")
        );
    }
}
