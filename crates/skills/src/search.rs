//! Case-insensitive keyword search over skill names and SKILL.md text.

use serde::Serialize;

use crate::types::SkillContent;

/// A skill that matched a search term, and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub name: String,
    pub description: String,
    pub matched_name: bool,
    pub matched_content: bool,
}

/// Lowercased search term. Build once, test many skills.
#[derive(Debug, Clone)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Returns `None` for a blank term. Surrounding whitespace is otherwise
    /// part of the term.
    pub fn new(term: &str) -> Option<Self> {
        (!term.trim().is_empty()).then(|| Self(term.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.0)
    }

    /// Match against the skill's directory name and its full SKILL.md text.
    pub fn match_skill(&self, skill: &SkillContent) -> Option<SearchHit> {
        let matched_name = self.matches(&skill.metadata.name);
        let matched_content = self.matches(&skill.text());
        (matched_name || matched_content).then(|| SearchHit {
            name: skill.metadata.name.clone(),
            description: skill.metadata.description.clone(),
            matched_name,
            matched_content,
        })
    }
}

/// Every skill matching `term`, in input order.
pub fn search_skills<'a>(
    term: &SearchTerm,
    skills: impl IntoIterator<Item = &'a SkillContent>,
) -> Vec<SearchHit> {
    skills
        .into_iter()
        .filter_map(|s| term.match_skill(s))
        .collect()
}
