use std::collections::BTreeMap;

use thiserror::Error;

/// Line that opens and closes the front-matter block.
pub const DELIMITER: &str = "---";

/// Why no front-matter block could be extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrontmatterError {
    #[error("missing front matter (file must start with a --- line)")]
    Missing,
    #[error("front matter is not closed by a --- line")]
    Unclosed,
}

/// State of a single front-matter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState<'a> {
    Missing,
    Empty,
    Present(&'a str),
}

/// Top-level `key: value` pairs from a SKILL.md front-matter block.
///
/// Non-scalar values (lists, maps) are kept as their YAML text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    fields: BTreeMap<String, String>,
}

impl Frontmatter {
    pub fn field(&self, key: &str) -> FieldState<'_> {
        match self.fields.get(key).map(|v| v.trim()) {
            None => FieldState::Missing,
            Some("") => FieldState::Empty,
            Some(v) => FieldState::Present(v),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self.field("name") {
            FieldState::Present(v) => Some(v),
            _ => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self.field("description") {
            FieldState::Present(v) => Some(v),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// Split SKILL.md content into (front matter, body).
///
/// The block opens at the first non-blank line, which must be exactly `---`,
/// and closes at the next line that is exactly `---`. Trailing whitespace and
/// CRLF line endings are tolerated on delimiter lines.
pub fn split_frontmatter(content: &str) -> Result<(&str, &str), FrontmatterError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut offset = 0;
    let mut block_start = None;

    for line in content.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let text = line.trim_end();

        match block_start {
            None if text.trim_start().is_empty() => continue,
            None if text == DELIMITER => block_start = Some(offset),
            None => return Err(FrontmatterError::Missing),
            Some(start) if text == DELIMITER => {
                return Ok((&content[start..line_start], &content[offset..]));
            },
            Some(_) => {},
        }
    }

    match block_start {
        None => Err(FrontmatterError::Missing),
        Some(_) => Err(FrontmatterError::Unclosed),
    }
}

/// Extract the front-matter block of a SKILL.md file into typed fields.
///
/// The block is read as YAML first. Blocks that are not valid YAML, which
/// happens with unquoted values such as `description: Use when: ...`, are
/// read with a tolerant line scanner instead.
pub fn parse_frontmatter(content: &str) -> Result<Frontmatter, FrontmatterError> {
    let (block, _body) = split_frontmatter(content)?;
    if block.trim().is_empty() {
        return Ok(Frontmatter::default());
    }
    Ok(from_yaml(block).unwrap_or_else(|| scan_lines(block)))
}

fn from_yaml(block: &str) -> Option<Frontmatter> {
    let mapping: serde_yaml::Mapping = serde_yaml::from_str(block).ok()?;
    let mut fields = BTreeMap::new();
    for (key, value) in mapping {
        let Some(key) = scalar_text(&key) else {
            continue;
        };
        let value = match scalar_text(&value) {
            Some(v) => v,
            None => serde_yaml::to_string(&value)
                .map(|s| s.trim_end().to_string())
                .unwrap_or_default(),
        };
        fields.insert(key, value);
    }
    Some(Frontmatter { fields })
}

fn scalar_text(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Null => Some(String::new()),
        _ => None,
    }
}

/// Pending key while scanning: name, collected parts, and the joiner between
/// parts (`\n` for `|` blocks, space otherwise).
struct PendingField {
    key: String,
    parts: Vec<String>,
    joiner: &'static str,
}

fn scan_lines(block: &str) -> Frontmatter {
    fn flush(pending: Option<PendingField>, fields: &mut BTreeMap<String, String>) {
        if let Some(p) = pending {
            fields.insert(p.key, p.parts.join(p.joiner));
        }
    }

    let mut fields = BTreeMap::new();
    let mut pending: Option<PendingField> = None;

    for line in block.lines() {
        if line.starts_with([' ', '\t']) || line.trim().is_empty() {
            if let Some(p) = pending.as_mut()
                && !line.trim().is_empty()
            {
                p.parts.push(line.trim().to_string());
            }
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        flush(pending.take(), &mut fields);

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        let (joiner, first) = match value.chars().next() {
            Some('|') => ("\n", None),
            Some('>') => (" ", None),
            _ => (" ", Some(unquote(value))),
        };
        pending = Some(PendingField {
            key: key.trim().to_string(),
            parts: first
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .into_iter()
                .collect(),
            joiner,
        });
    }
    flush(pending.take(), &mut fields);

    Frontmatter { fields }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Validate a skill identifier: lowercase ASCII, digits, single hyphens, 1-64 chars.
pub fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !name.starts_with('-')
        && !name.ends_with('-')
        && !name.contains("--")
}
