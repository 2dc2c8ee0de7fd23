use std::path::{Path, PathBuf};

use {
    tracing::{debug, info, warn},
    walkdir::WalkDir,
};

use crate::{
    discover,
    error::{IoContext, Result, SkillsError},
    registry::is_plain_name,
};

/// Global locations skills can be installed into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLocations {
    /// Preferred location; created when no location exists yet.
    pub primary: PathBuf,
    /// Used only when it exists and `primary` does not.
    pub fallback: PathBuf,
    /// Bypasses the primary/fallback lookup entirely.
    pub explicit: Option<PathBuf>,
}

/// Which rule picked the install target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetChoice {
    Explicit,
    Primary,
    Fallback,
    /// Neither location existed; the primary will be created.
    NewPrimary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    pub dir: PathBuf,
    pub choice: TargetChoice,
}

impl InstallLocations {
    /// Pick the target directory without touching the filesystem.
    ///
    /// Precedence: explicit target, then `primary` if it is a directory, then
    /// `fallback` if it is a directory, else `primary` (to be created).
    pub fn resolve(&self) -> InstallTarget {
        let (dir, choice) = if let Some(ref dir) = self.explicit {
            (dir.clone(), TargetChoice::Explicit)
        } else if self.primary.is_dir() {
            (self.primary.clone(), TargetChoice::Primary)
        } else if self.fallback.is_dir() {
            (self.fallback.clone(), TargetChoice::Fallback)
        } else {
            (self.primary.clone(), TargetChoice::NewPrimary)
        };
        InstallTarget { dir, choice }
    }
}

impl InstallTarget {
    fn create(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir).with_path(&self.dir)?;
        debug!(dir = ?self.dir, choice = ?self.choice, "install target ready");
        Ok(())
    }
}

/// A single skill copied into a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub name: String,
    /// Directory the skill was installed into, and how it was chosen.
    pub target: InstallTarget,
    pub destination: PathBuf,
    /// Regular files copied.
    pub files: usize,
}

/// Result of installing every skill. Failures do not stop the others.
#[derive(Debug, Default)]
pub struct InstallAllReport {
    pub target: Option<InstallTarget>,
    pub installed: Vec<InstallOutcome>,
    pub failed: Vec<(String, SkillsError)>,
}

/// Copy `<root>/<name>/` into the resolved target as `<target>/<name>/`.
///
/// An existing destination is replaced entirely, so files removed from the
/// source do not linger in the installed copy.
pub fn install_skill(
    root: &Path,
    name: &str,
    locations: &InstallLocations,
) -> Result<InstallOutcome> {
    let src = root.join(name);
    if !is_plain_name(name) || !discover::has_skill_file(&src) {
        return Err(SkillsError::NotFound(name.to_string()));
    }
    let target = locations.resolve();
    guard_overlap(&src, &target.dir.join(name))?;
    target.create()?;
    install_into(&src, name, &target)
}

/// Install every skill under `root` into one resolved target.
pub fn install_all(root: &Path, locations: &InstallLocations) -> Result<InstallAllReport> {
    let skills: Vec<_> = discover::skill_dirs(root)?
        .into_iter()
        .filter(|(_, dir)| discover::has_skill_file(dir))
        .collect();
    let target = locations.resolve();
    for (name, src) in &skills {
        guard_overlap(src, &target.dir.join(name))?;
    }
    target.create()?;

    let mut report = InstallAllReport::default();
    for (name, src) in skills {
        match install_into(&src, &name, &target) {
            Ok(outcome) => report.installed.push(outcome),
            Err(e) => {
                warn!(%name, %e, "failed to install skill");
                report.failed.push((name, e));
            },
        }
    }
    info!(
        count = report.installed.len(),
        failed = report.failed.len(),
        target = ?target.dir,
        "installed skills"
    );
    report.target = Some(target);
    Ok(report)
}

fn install_into(src: &Path, name: &str, target: &InstallTarget) -> Result<InstallOutcome> {
    let destination = target.dir.join(name);
    remove_existing(&destination)?;
    let files = copy_tree(src, &destination)?;
    info!(%name, dest = ?destination, files, "installed skill");
    Ok(InstallOutcome {
        name: name.to_string(),
        target: target.clone(),
        destination,
        files,
    })
}

/// Refuse to install a skill onto itself, into its own subtree, or over one
/// of its ancestors. Runs before anything is created, so `destination` may
/// not exist yet.
fn guard_overlap(src: &Path, destination: &Path) -> Result<()> {
    let src = src.canonicalize().with_path(src)?;
    let dest = resolve_existing_prefix(destination)?;
    if dest.starts_with(&src) || src.starts_with(&dest) {
        return Err(SkillsError::message(format!(
            "refusing to install {} over its own source {}",
            dest.display(),
            src.display()
        )));
    }
    Ok(())
}

/// Canonicalize the longest existing ancestor of `path` and re-append the
/// components that do not exist yet.
fn resolve_existing_prefix(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path).with_path(path)?;
    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(base) = existing.canonicalize() {
            return Ok(missing.iter().rev().fold(base, |acc, part| acc.join(part)));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(part)) => {
                missing.push(part);
                existing = parent;
            },
            _ => return Ok(absolute),
        }
    }
}

fn remove_existing(path: &Path) -> Result<()> {
    let Ok(meta) = std::fs::symlink_metadata(path) else {
        return Ok(());
    };
    debug!(?path, "replacing existing install");
    if meta.is_dir() {
        std::fs::remove_dir_all(path).with_path(path)
    } else {
        std::fs::remove_file(path).with_path(path)
    }
}

/// Recursively copy `src` to `dest`.
///
/// A symlink to a regular file is copied as that file's content, so an
/// installed skill never lacks a file its source resolves. Symlinks to
/// directories and dangling links are skipped.
fn copy_tree(src: &Path, dest: &Path) -> Result<usize> {
    let mut files = 0;
    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            SkillsError::io(path, e.into())
        })?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| SkillsError::message("walked outside skill directory"))?;
        let out = dest.join(rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            std::fs::create_dir_all(&out).with_path(&out)?;
        } else if file_type.is_file() || is_file_link(entry.path()) {
            std::fs::copy(entry.path(), &out).with_path(&out)?;
            files += 1;
        } else {
            warn!(path = ?entry.path(), "skipping directory symlink or special file");
        }
    }
    Ok(files)
}

/// Symlink that resolves to a regular file.
fn is_file_link(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink())
        && std::fs::metadata(path).is_ok_and(|m| m.is_file())
}
