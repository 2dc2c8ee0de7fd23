//! Structural validation of skill directories.
//!
//! Checks run in a fixed order and stop at the first failure:
//! SKILL.md exists, front matter is delimited, `name` is present,
//! `description` is present, and the description starts with `Use when`.
//! Name/directory mismatches are reported as warnings and never make a skill
//! invalid.

use std::path::Path;

use {serde::Serialize, thiserror::Error};

use crate::{
    discover,
    error::{Result, SkillsError},
    parse::{self, FieldState, FrontmatterError},
    registry::is_plain_name,
    types::SKILL_FILE,
};

/// Phrase every description must begin with so agents know when to apply it.
pub const DESCRIPTION_TRIGGER: &str = "Use when";

/// First structural check a skill failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("missing SKILL.md")]
    MissingSkillFile,
    #[error("SKILL.md could not be read: {0}")]
    Unreadable(String),
    #[error("missing frontmatter (--- delimiters)")]
    MissingFrontmatter,
    #[error("frontmatter is missing its closing ---")]
    UnclosedFrontmatter,
    #[error("missing 'name:' field")]
    MissingName,
    #[error("missing 'description:' field")]
    MissingDescription,
    #[error("description must start with 'Use when'")]
    DescriptionTrigger,
}

impl From<FrontmatterError> for ValidationIssue {
    fn from(e: FrontmatterError) -> Self {
        match e {
            FrontmatterError::Missing => Self::MissingFrontmatter,
            FrontmatterError::Unclosed => Self::UnclosedFrontmatter,
        }
    }
}

/// Non-fatal observations about an otherwise checked skill.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationWarning {
    #[error("name '{declared}' does not match directory '{dir}'")]
    NameMismatch { declared: String, dir: String },
    #[error("directory name '{0}' is not lowercase letters, digits and hyphens")]
    InvalidIdentifier(String),
}

/// Outcome of validating one skill directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillCheck {
    pub name: String,
    pub issue: Option<ValidationIssue>,
    pub warnings: Vec<ValidationWarning>,
}

impl SkillCheck {
    pub fn is_valid(&self) -> bool {
        self.issue.is_none()
    }
}

/// Outcome of validating every skill directory under a root.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub checks: Vec<SkillCheck>,
}

impl ValidationReport {
    pub fn total(&self) -> usize {
        self.checks.len()
    }

    pub fn valid(&self) -> usize {
        self.checks.iter().filter(|c| c.is_valid()).count()
    }

    pub fn invalid(&self) -> usize {
        self.total() - self.valid()
    }
}

/// JSON shape for a single check.
#[derive(Serialize)]
pub struct CheckSummary<'a> {
    pub name: &'a str,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl<'a> From<&'a SkillCheck> for CheckSummary<'a> {
    fn from(check: &'a SkillCheck) -> Self {
        Self {
            name: &check.name,
            valid: check.is_valid(),
            error: check.issue.as_ref().map(ToString::to_string),
            warnings: check.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Validate the skill in `dir`, named after the directory.
pub fn check_skill(dir: &Path) -> SkillCheck {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut warnings = Vec::new();
    if !parse::is_valid_identifier(&name) {
        warnings.push(ValidationWarning::InvalidIdentifier(name.clone()));
    }

    let issue = match check_content(dir) {
        Ok(declared) => {
            if declared != name {
                warnings.push(ValidationWarning::NameMismatch {
                    declared,
                    dir: name.clone(),
                });
            }
            None
        },
        Err(issue) => Some(issue),
    };

    SkillCheck {
        name,
        issue,
        warnings,
    }
}

/// Run the ordered checks; returns the declared name on success.
fn check_content(dir: &Path) -> std::result::Result<String, ValidationIssue> {
    if !discover::has_skill_file(dir) {
        return Err(ValidationIssue::MissingSkillFile);
    }
    let content = std::fs::read_to_string(dir.join(SKILL_FILE))
        .map_err(|e| ValidationIssue::Unreadable(e.to_string()))?;
    let fm = parse::parse_frontmatter(&content)?;

    let declared = match fm.field("name") {
        FieldState::Missing => return Err(ValidationIssue::MissingName),
        FieldState::Empty => String::new(),
        FieldState::Present(v) => v.to_string(),
    };
    match fm.field("description") {
        FieldState::Missing => Err(ValidationIssue::MissingDescription),
        FieldState::Present(v) if v.starts_with(DESCRIPTION_TRIGGER) => Ok(declared),
        FieldState::Empty | FieldState::Present(_) => Err(ValidationIssue::DescriptionTrigger),
    }
}

/// Validate a single named skill. Fails with `NotFound` when the directory
/// does not exist; an existing but invalid skill is a normal result.
pub fn validate_one(root: &Path, name: &str) -> Result<SkillCheck> {
    let dir = root.join(name);
    if !is_plain_name(name) || !dir.is_dir() {
        return Err(SkillsError::NotFound(name.to_string()));
    }
    Ok(check_skill(&dir))
}

/// Validate every skill directory under `root`. Invalid skills never abort
/// the run; only a missing root does.
pub fn validate_all(root: &Path) -> Result<ValidationReport> {
    let checks = discover::skill_dirs(root)?
        .into_iter()
        .map(|(_, dir)| check_skill(&dir))
        .collect();
    Ok(ValidationReport { checks })
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    fn skill_dir(root: &Path, name: &str, content: Option<&str>) -> std::path::PathBuf {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        if let Some(content) = content {
            std::fs::write(dir.join(SKILL_FILE), content).unwrap();
        }
        dir
    }

    #[rstest]
    #[case::valid(
        Some("---\nname: alpha\ndescription: Use when testing alpha things\n---\n"),
        None
    )]
    #[case::quoted(
        Some("---\nname: alpha\ndescription: \"Use when quoting\"\n---\n"),
        None
    )]
    #[case::colon_in_description(
        Some("---\nname: alpha\ndescription: Use when: asked\n---\n"),
        None
    )]
    #[case::no_file(None, Some(ValidationIssue::MissingSkillFile))]
    #[case::no_frontmatter(
        Some("# Alpha\nname: alpha\n"),
        Some(ValidationIssue::MissingFrontmatter)
    )]
    #[case::unclosed(
        Some("---\nname: alpha\ndescription: Use when x\n"),
        Some(ValidationIssue::UnclosedFrontmatter)
    )]
    #[case::no_name(
        Some("---\ndescription: Use when x\n---\n"),
        Some(ValidationIssue::MissingName)
    )]
    #[case::no_description(
        Some("---\nname: alpha\n---\n"),
        Some(ValidationIssue::MissingDescription)
    )]
    #[case::name_checked_before_description(
        Some("---\ntitle: alpha\n---\n"),
        Some(ValidationIssue::MissingName)
    )]
    #[case::wrong_trigger(
        Some("---\nname: alpha\ndescription: Helps with alpha\n---\n"),
        Some(ValidationIssue::DescriptionTrigger)
    )]
    #[case::trigger_not_at_start(
        Some("---\nname: alpha\ndescription: Helps. Use when alpha\n---\n"),
        Some(ValidationIssue::DescriptionTrigger)
    )]
    #[case::empty_description(
        Some("---\nname: alpha\ndescription:\n---\n"),
        Some(ValidationIssue::DescriptionTrigger)
    )]
    #[case::fields_outside_frontmatter(
        Some("---\ntitle: x\n---\nname: alpha\ndescription: Use when x\n"),
        Some(ValidationIssue::MissingName)
    )]
    fn check_order(#[case] content: Option<&str>, #[case] expected: Option<ValidationIssue>) {
        let tmp = tempfile::tempdir().unwrap();
        let dir = skill_dir(tmp.path(), "alpha", content);
        assert_eq!(check_skill(&dir).issue, expected);
    }

    #[test]
    fn trigger_message() {
        assert_eq!(
            ValidationIssue::DescriptionTrigger.to_string(),
            "description must start with 'Use when'"
        );
    }

    #[test]
    fn name_mismatch_is_a_warning_only() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = skill_dir(
            tmp.path(),
            "alpha",
            Some("---\nname: other\ndescription: Use when x\n---\n"),
        );
        let check = check_skill(&dir);
        assert!(check.is_valid());
        assert_eq!(check.warnings, vec![ValidationWarning::NameMismatch {
            declared: "other".into(),
            dir: "alpha".into(),
        }]);
    }

    #[test]
    fn bad_identifier_is_a_warning_only() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = skill_dir(
            tmp.path(),
            "My_Skill",
            Some("---\nname: My_Skill\ndescription: Use when x\n---\n"),
        );
        let check = check_skill(&dir);
        assert!(check.is_valid());
        assert_eq!(check.warnings, vec![ValidationWarning::InvalidIdentifier(
            "My_Skill".into()
        )]);
    }

    #[test]
    fn validate_one_missing_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = validate_one(tmp.path(), "nonexistent-skill").unwrap_err();
        assert_eq!(err.to_string(), "Skill not found: nonexistent-skill");
    }

    #[test]
    fn validate_one_reports_invalid_without_error() {
        let tmp = tempfile::tempdir().unwrap();
        skill_dir(tmp.path(), "beta", Some("---\nname: beta\n---\n"));
        let check = validate_one(tmp.path(), "beta").unwrap();
        assert_eq!(check.issue, Some(ValidationIssue::MissingDescription));
    }

    #[test]
    fn validate_all_counts_every_directory() {
        let tmp = tempfile::tempdir().unwrap();
        skill_dir(
            tmp.path(),
            "alpha",
            Some("---\nname: alpha\ndescription: Use when testing alpha things\n---\n"),
        );
        skill_dir(tmp.path(), "beta", Some("---\nname: beta\n---\n"));
        skill_dir(tmp.path(), "empty", None);

        let report = validate_all(tmp.path()).unwrap();
        assert_eq!(report.total(), 3);
        assert_eq!(report.valid(), 1);
        assert_eq!(report.invalid(), 2);
        assert_eq!(report.checks[2].issue, Some(ValidationIssue::MissingSkillFile));
    }

    #[test]
    fn validate_all_missing_root_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let err = validate_all(&tmp.path().join("skills")).unwrap_err();
        assert!(matches!(err, SkillsError::SkillsDirMissing(_)));
    }

    #[test]
    fn summary_serializes_issue_text() {
        let check = SkillCheck {
            name: "beta".into(),
            issue: Some(ValidationIssue::MissingDescription),
            warnings: vec![],
        };
        let summary = CheckSummary::from(&check);
        assert!(!summary.valid);
        assert_eq!(summary.error.as_deref(), Some("missing 'description:' field"));
    }
}
