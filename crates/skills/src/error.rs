use std::path::PathBuf;

use thiserror::Error;

use crate::parse::FrontmatterError;

#[derive(Error, Debug)]
pub enum SkillsError {
    /// The skills root itself is absent. Nothing can be listed or checked.
    #[error("skills directory not found: {}", .0.display())]
    SkillsDirMissing(PathBuf),

    #[error("Skill not found: {0}")]
    NotFound(String),

    /// A required argument was missing or empty.
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Frontmatter(#[from] FrontmatterError),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Message(String),
}

impl SkillsError {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SkillsError>;

/// Attach a filesystem path to an `io::Result`.
pub trait IoContext<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| SkillsError::io(path, source))
    }
}
