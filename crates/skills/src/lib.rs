//! Skill repository management: discovery, front-matter parsing, search,
//! validation, and installation.
//!
//! Skills are directories under a `skills/` root, each containing a
//! `SKILL.md` file that starts with a `---` delimited front-matter block.

pub mod discover;
pub mod error;
pub mod install;
pub mod parse;
pub mod registry;
pub mod search;
pub mod types;
pub mod validate;

pub use error::{Result, SkillsError};
