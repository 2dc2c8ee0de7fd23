//! Handlers for the skill management commands.

use std::path::{Path, PathBuf};

use {
    anyhow::Result,
    clap::Subcommand,
    skillkit_config::{InstallConfig, SkillkitConfig, expand_home},
    skillkit_skills::{
        SkillsError,
        discover::FsSkillDiscoverer,
        install::{self, InstallLocations, InstallTarget, TargetChoice},
        registry::{self, InMemoryRegistry, SkillRegistry},
        validate::{self, CheckSummary, SkillCheck},
    },
    tracing::debug,
};

use crate::output;

#[derive(Subcommand)]
pub enum SkillAction {
    /// List all skills with their descriptions.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print a skill's SKILL.md exactly as stored.
    Show {
        /// Skill name.
        name: Option<String>,
    },
    /// Find skills whose name or SKILL.md contains a term (case-insensitive).
    Search {
        /// Search term.
        term: Option<String>,
    },
    /// Count total, valid and invalid skills.
    Stats,
    /// Check SKILL.md structure for one skill, or all skills.
    Validate {
        /// Skill name. Validates every skill when omitted.
        name: Option<String>,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Copy a skill into the global skills location.
    Install {
        /// Skill name.
        name: Option<String>,
        /// Install here instead of the primary/fallback location.
        #[arg(long, env = "SKILLKIT_INSTALL_TARGET")]
        target: Option<PathBuf>,
    },
    /// Copy every skill into the global skills location.
    InstallAll {
        /// Install here instead of the primary/fallback location.
        #[arg(long, env = "SKILLKIT_INSTALL_TARGET")]
        target: Option<PathBuf>,
    },
}

/// Paths every command works against, resolved from flags and config.
pub struct SkillsContext {
    pub skills_dir: PathBuf,
    pub install: InstallConfig,
}

impl SkillsContext {
    pub fn load(skills_dir: Option<&Path>, config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => skillkit_config::load_config(path)?,
            None => skillkit_config::discover_and_load(),
        };
        Ok(Self::from_config(skills_dir, config))
    }

    fn from_config(skills_dir: Option<&Path>, config: SkillkitConfig) -> Self {
        let skills_dir = skillkit_config::resolve_skills_dir(skills_dir, &config);
        debug!(skills_dir = %skills_dir.display(), "resolved skills directory");
        Self {
            skills_dir,
            install: config.install,
        }
    }

    fn locations(&self, target: Option<PathBuf>) -> InstallLocations {
        InstallLocations {
            primary: self.install.primary_dir(),
            fallback: self.install.fallback_dir(),
            explicit: target
                .map(expand_home)
                .or_else(|| self.install.target_dir()),
        }
    }
}

/// Fail with a usage line when a required argument is missing or blank.
fn required(value: Option<String>, usage: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(SkillsError::Usage(format!("Usage: skillkit {usage}")).into()),
    }
}

/// Run a command. Required arguments are checked before the context is
/// loaded, so a usage error never touches the filesystem.
pub async fn handle_skills(
    action: SkillAction,
    load: impl FnOnce() -> Result<SkillsContext>,
) -> Result<()> {
    match action {
        SkillAction::List { json } => list(&load()?, json).await,
        SkillAction::Show { name } => {
            let name = required(name, "show <skill-name>")?;
            show(&load()?, &name).await
        },
        SkillAction::Search { term } => {
            let term = required(term, "search <term>")?;
            search(&load()?, &term).await
        },
        SkillAction::Stats => stats(&load()?),
        SkillAction::Validate { name, json } => validate(&load()?, name.as_deref(), json),
        SkillAction::Install { name, target } => {
            let name = required(name, "install <skill-name>")?;
            install_one(&load()?, &name, target)
        },
        SkillAction::InstallAll { target } => install_every(&load()?, target),
    }
}

async fn list(ctx: &SkillsContext, json: bool) -> Result<()> {
    let discoverer = FsSkillDiscoverer::new(&ctx.skills_dir);
    let registry = InMemoryRegistry::from_discoverer(&discoverer).await?;
    let skills = registry.list_skills().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&skills)?);
        return Ok(());
    }

    output::info(&format!("Skills in {}:", ctx.skills_dir.display()));
    println!();
    for skill in &skills {
        println!("  {}", output::bold(&skill.name));
        let summary = skill.summary();
        if !summary.is_empty() {
            println!("    {summary}");
        }
    }
    println!();
    output::success(&format!("Total: {} skill(s)", skills.len()));
    Ok(())
}

async fn show(ctx: &SkillsContext, name: &str) -> Result<()> {
    use std::io::Write;

    let content = registry::load_skill_from_dir(&ctx.skills_dir, name).await?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&content.raw)?;
    stdout.flush()?;
    Ok(())
}

async fn search(ctx: &SkillsContext, term: &str) -> Result<()> {
    let discoverer = FsSkillDiscoverer::new(&ctx.skills_dir);
    let registry = InMemoryRegistry::from_discoverer(&discoverer).await?;

    output::info(&format!("Searching for '{term}'..."));
    let hits = registry.search(term).await?;
    if hits.is_empty() {
        output::warn(&format!("No skills found matching '{term}'"));
        return Ok(());
    }

    for hit in &hits {
        output::success(&format!("✓ {}", hit.name));
        let summary = hit.description.lines().next().unwrap_or("").trim();
        if !summary.is_empty() {
            println!("    {summary}");
        }
    }
    println!();
    output::info(&format!("Found {} skill(s) matching '{term}'", hits.len()));
    Ok(())
}

fn stats(ctx: &SkillsContext) -> Result<()> {
    let report = validate::validate_all(&ctx.skills_dir)?;

    output::info("Skill statistics:");
    println!("Total skills: {}", report.total());
    output::success(&format!("Valid skills: {}", report.valid()));
    if report.invalid() > 0 {
        output::failure(&format!("Invalid skills: {}", report.invalid()));
    }
    Ok(())
}

fn print_check(check: &SkillCheck) {
    match check.issue {
        None => output::success(&format!("✓ {}", check.name)),
        Some(ref issue) => output::failure(&format!("✗ {}: {issue}", check.name)),
    }
    for warning in &check.warnings {
        output::warn(&format!("    ⚠ {warning}"));
    }
}

fn validate(ctx: &SkillsContext, name: Option<&str>, json: bool) -> Result<()> {
    if let Some(name) = name {
        let check = validate::validate_one(&ctx.skills_dir, name)?;
        if json {
            println!(
                "{}",
                serde_json::to_string_pretty(&CheckSummary::from(&check))?
            );
        } else {
            print_check(&check);
        }
        return Ok(());
    }

    let report = validate::validate_all(&ctx.skills_dir)?;
    if json {
        let summaries: Vec<CheckSummary<'_>> = report.checks.iter().map(Into::into).collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    output::info(&format!("Validating skills in {}:", ctx.skills_dir.display()));
    for check in &report.checks {
        print_check(check);
    }
    println!();
    output::success(&format!("Passed: {}", report.valid()));
    if report.invalid() > 0 {
        output::failure(&format!("Failed: {}", report.invalid()));
    }
    Ok(())
}

/// Reported once the skill has been found and the target is in place.
fn announce_target(target: &InstallTarget) {
    match target.choice {
        TargetChoice::NewPrimary => {
            output::info(&format!("Created {}", target.dir.display()));
        },
        TargetChoice::Explicit | TargetChoice::Primary | TargetChoice::Fallback => {
            output::info(&format!("Installing to {}", target.dir.display()));
        },
    }
}

fn install_one(ctx: &SkillsContext, name: &str, target: Option<PathBuf>) -> Result<()> {
    let locations = ctx.locations(target);
    let outcome = install::install_skill(&ctx.skills_dir, name, &locations)?;
    announce_target(&outcome.target);
    output::success(&format!(
        "✓ Installed {} → {}",
        outcome.name,
        outcome.destination.display()
    ));
    Ok(())
}

fn install_every(ctx: &SkillsContext, target: Option<PathBuf>) -> Result<()> {
    let locations = ctx.locations(target);
    let report = install::install_all(&ctx.skills_dir, &locations)?;
    if let Some(ref target) = report.target {
        announce_target(target);
    }

    for outcome in &report.installed {
        output::success(&format!("✓ {}", outcome.name));
    }
    for (name, e) in &report.failed {
        output::failure(&format!("✗ {name}: {e}"));
    }
    println!();
    if let Some(ref target) = report.target {
        output::success(&format!(
            "Installed {} skill(s) to {}",
            report.installed.len(),
            target.dir.display()
        ));
    }
    if !report.failed.is_empty() {
        anyhow::bail!("{} skill(s) failed to install", report.failed.len());
    }
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_missing_and_blank() {
        let err = required(None, "show <skill-name>").unwrap_err();
        assert_eq!(err.to_string(), "Usage: skillkit show <skill-name>");
        assert!(required(Some("  ".into()), "search <term>").is_err());
        assert_eq!(required(Some("alpha".into()), "x").unwrap(), "alpha");
    }

    #[test]
    fn flag_target_overrides_config_target() {
        let ctx = SkillsContext::from_config(Some(Path::new("/skills")), SkillkitConfig {
            install: InstallConfig {
                target: Some(PathBuf::from("/from/config")),
                ..Default::default()
            },
            ..Default::default()
        });
        assert_eq!(
            ctx.locations(Some(PathBuf::from("/from/flag"))).explicit,
            Some(PathBuf::from("/from/flag"))
        );
        assert_eq!(
            ctx.locations(None).explicit,
            Some(PathBuf::from("/from/config"))
        );
    }

    #[tokio::test]
    async fn usage_error_does_not_load_context() {
        let err = handle_skills(SkillAction::Show { name: None }, || -> Result<SkillsContext> {
            panic!("context must not be loaded")
        })
        .await
        .unwrap_err();
        assert!(err.to_string().starts_with("Usage:"));
    }
}
