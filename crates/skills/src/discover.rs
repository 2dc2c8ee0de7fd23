use std::path::{Path, PathBuf};

use {async_trait::async_trait, tracing::debug};

use crate::{
    error::{IoContext, Result, SkillsError},
    parse,
    types::{SKILL_FILE, SkillMetadata},
};

/// Discovers skills from a source.
#[async_trait]
pub trait SkillDiscoverer: Send + Sync {
    /// Return metadata for all discovered skills, sorted by name.
    async fn discover(&self) -> Result<Vec<SkillMetadata>>;

    /// Directory the skills live in.
    fn root(&self) -> &Path;
}

/// Filesystem discoverer over a single `skills/` root, one level deep.
pub struct FsSkillDiscoverer {
    root: PathBuf,
}

impl FsSkillDiscoverer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl SkillDiscoverer for FsSkillDiscoverer {
    async fn discover(&self) -> Result<Vec<SkillMetadata>> {
        let mut skills = Vec::new();
        for (name, dir) in skill_dirs(&self.root)? {
            if !has_skill_file(&dir) {
                debug!(?dir, "skipping directory without SKILL.md");
                continue;
            }
            skills.push(read_metadata(name, dir));
        }
        debug!(root = ?self.root, count = skills.len(), "discovered skills");
        Ok(skills)
    }

    fn root(&self) -> &Path {
        &self.root
    }
}

/// Every immediate, non-hidden subdirectory of `root` as `(name, path)`,
/// sorted by name, whether or not it holds a SKILL.md.
pub fn skill_dirs(root: &Path) -> Result<Vec<(String, PathBuf)>> {
    if !root.is_dir() {
        return Err(SkillsError::SkillsDirMissing(root.to_path_buf()));
    }

    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(root).with_path(root)? {
        let entry = entry.with_path(root)?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        dirs.push((name, path));
    }
    dirs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(dirs)
}

/// Whether `dir` holds a regular file named exactly `SKILL.md`.
///
/// Compares directory entry names so that `skill.md` does not count on
/// case-insensitive filesystems.
pub fn has_skill_file(dir: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    entries
        .flatten()
        .any(|e| e.file_name() == SKILL_FILE && e.path().is_file())
}

/// Build metadata for a skill directory. Never fails: unreadable files or
/// malformed front matter yield an empty description.
pub fn read_metadata(name: String, dir: PathBuf) -> SkillMetadata {
    let skill_md = dir.join(SKILL_FILE);
    let frontmatter = match std::fs::read_to_string(&skill_md) {
        Ok(content) => match parse::parse_frontmatter(&content) {
            Ok(fm) => Some(fm),
            Err(e) => {
                debug!(?skill_md, %e, "no usable front matter");
                None
            },
        },
        Err(e) => {
            tracing::warn!(?skill_md, %e, "failed to read SKILL.md");
            None
        },
    };

    SkillMetadata {
        description: frontmatter
            .as_ref()
            .and_then(|fm| fm.description())
            .unwrap_or_default()
            .to_string(),
        declared_name: frontmatter
            .as_ref()
            .and_then(|fm| fm.name())
            .map(str::to_string),
        name,
        path: dir,
    }
}
