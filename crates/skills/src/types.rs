use std::path::PathBuf;

use serde::Serialize;

/// File that marks a directory as a skill. Matched case-sensitively.
pub const SKILL_FILE: &str = "SKILL.md";

/// Lightweight metadata for a discovered skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillMetadata {
    /// Directory name; the skill's identifier.
    pub name: String,
    /// Best-effort description from front matter. Empty when unavailable.
    pub description: String,
    /// `name:` as declared in front matter, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_name: Option<String>,
    /// Filesystem path to the skill directory.
    pub path: PathBuf,
}

impl SkillMetadata {
    pub fn skill_file(&self) -> PathBuf {
        self.path.join(SKILL_FILE)
    }

    /// First non-empty line of the description, for one-line listings.
    pub fn summary(&self) -> &str {
        self.description
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("")
    }
}

/// Full skill content: metadata plus the raw, untransformed SKILL.md bytes.
#[derive(Debug, Clone)]
pub struct SkillContent {
    pub metadata: SkillMetadata,
    pub raw: Vec<u8>,
}

impl SkillContent {
    /// SKILL.md as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.raw)
    }
}
