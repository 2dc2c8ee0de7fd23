use std::{
    collections::BTreeMap,
    path::{Component, Path},
};

use async_trait::async_trait;

use crate::{
    discover::{self, SkillDiscoverer},
    error::{IoContext, Result, SkillsError},
    search::{SearchHit, SearchTerm, search_skills},
    types::{SKILL_FILE, SkillContent, SkillMetadata},
};

/// Read access to a set of skills.
#[async_trait]
pub trait SkillRegistry: Send + Sync {
    /// List metadata for all available skills, sorted by name.
    async fn list_skills(&self) -> Result<Vec<SkillMetadata>>;

    /// Load the full content of a skill by name.
    async fn load_skill(&self, name: &str) -> Result<SkillContent>;

    /// Case-insensitive substring search over names and SKILL.md text.
    async fn search(&self, term: &str) -> Result<Vec<SearchHit>>;
}

/// In-memory registry backed by a discoverer.
#[derive(Default)]
pub struct InMemoryRegistry {
    skills: BTreeMap<String, SkillMetadata>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the registry from a discoverer.
    pub async fn from_discoverer(discoverer: &dyn SkillDiscoverer) -> Result<Self> {
        let skills = discoverer
            .discover()
            .await?
            .into_iter()
            .map(|meta| (meta.name.clone(), meta))
            .collect();
        Ok(Self { skills })
    }

    /// Add a skill directly (useful for testing).
    pub fn insert(&mut self, meta: SkillMetadata) {
        self.skills.insert(meta.name.clone(), meta);
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

#[async_trait]
impl SkillRegistry for InMemoryRegistry {
    async fn list_skills(&self) -> Result<Vec<SkillMetadata>> {
        Ok(self.skills.values().cloned().collect())
    }

    async fn load_skill(&self, name: &str) -> Result<SkillContent> {
        let meta = self
            .skills
            .get(name)
            .ok_or_else(|| SkillsError::NotFound(name.to_string()))?;
        let skill_md = meta.skill_file();
        let raw = tokio::fs::read(&skill_md).await.with_path(&skill_md)?;
        Ok(SkillContent {
            metadata: meta.clone(),
            raw,
        })
    }

    async fn search(&self, term: &str) -> Result<Vec<SearchHit>> {
        let term = SearchTerm::new(term)
            .ok_or_else(|| SkillsError::Usage("search term must not be empty".into()))?;

        let mut contents = Vec::with_capacity(self.skills.len());
        for name in self.skills.keys() {
            match self.load_skill(name).await {
                Ok(content) => contents.push(content),
                Err(e) => tracing::warn!(%name, %e, "skipping unreadable skill"),
            }
        }
        Ok(search_skills(&term, &contents))
    }
}

/// Load `<root>/<name>/SKILL.md` without scanning the other skills.
pub async fn load_skill_from_dir(root: &Path, name: &str) -> Result<SkillContent> {
    if !is_plain_name(name) {
        return Err(SkillsError::NotFound(name.to_string()));
    }
    let dir = root.join(name);
    if !discover::has_skill_file(&dir) {
        return Err(SkillsError::NotFound(name.to_string()));
    }
    let skill_md = dir.join(SKILL_FILE);
    let raw = tokio::fs::read(&skill_md).await.with_path(&skill_md)?;
    Ok(SkillContent {
        metadata: discover::read_metadata(name.to_string(), dir),
        raw,
    })
}

/// A single normal path component: no separators, `.`, or `..`.
pub(crate) fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, crate::discover::FsSkillDiscoverer};

    fn fixture() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("alpha")).unwrap();
        std::fs::write(
            tmp.path().join("alpha/SKILL.md"),
            "---\nname: alpha\ndescription: Use when testing alpha things\n---\n# Alpha\n",
        )
        .unwrap();
        std::fs::create_dir_all(tmp.path().join("beta")).unwrap();
        std::fs::write(tmp.path().join("beta/SKILL.md"), "---\nname: beta\n---\nBeta body\n")
            .unwrap();
        tmp
    }

    #[tokio::test]
    async fn test_registry_list_and_load() {
        let tmp = fixture();
        let reg = InMemoryRegistry::from_discoverer(&FsSkillDiscoverer::new(tmp.path()))
            .await
            .unwrap();
        assert_eq!(reg.len(), 2);

        let names: Vec<_> = reg
            .list_skills()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["alpha", "beta"]);

        let content = reg.load_skill("beta").await.unwrap();
        assert_eq!(
            content.raw,
            std::fs::read(tmp.path().join("beta/SKILL.md")).unwrap()
        );
    }

    #[tokio::test]
    async fn test_load_nonexistent_skill() {
        let reg = InMemoryRegistry::new();
        let err = reg.load_skill("nope").await.unwrap_err();
        assert!(matches!(err, SkillsError::NotFound(ref n) if n == "nope"));
    }

    #[tokio::test]
    async fn test_search_matches_one() {
        let tmp = fixture();
        let reg = InMemoryRegistry::from_discoverer(&FsSkillDiscoverer::new(tmp.path()))
            .await
            .unwrap();

        let hits = reg.search("alpha").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "alpha");

        let hits = reg.search("BETA BODY").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "beta");
    }

    #[tokio::test]
    async fn test_search_rejects_empty_term() {
        let reg = InMemoryRegistry::new();
        assert!(matches!(
            reg.search("").await.unwrap_err(),
            SkillsError::Usage(_)
        ));
    }

    #[tokio::test]
    async fn test_load_from_dir_is_byte_exact() {
        let tmp = fixture();
        let bytes = b"---\r\nname: gamma\r\n---\r\n\xff raw bytes\n".to_vec();
        std::fs::create_dir_all(tmp.path().join("gamma")).unwrap();
        std::fs::write(tmp.path().join("gamma/SKILL.md"), &bytes).unwrap();

        let content = load_skill_from_dir(tmp.path(), "gamma").await.unwrap();
        assert_eq!(content.raw, bytes);
    }

    #[tokio::test]
    async fn test_load_from_dir_not_found() {
        let tmp = fixture();
        for name in ["missing", "../alpha", "alpha/..", ".", ""] {
            let err = load_skill_from_dir(tmp.path(), name).await.unwrap_err();
            assert!(matches!(err, SkillsError::NotFound(_)), "{name}");
        }
    }

    #[test]
    fn test_is_plain_name() {
        assert!(is_plain_name("alpha"));
        assert!(!is_plain_name("a/b"));
        assert!(!is_plain_name(".."));
        assert!(!is_plain_name("/abs"));
    }
}
