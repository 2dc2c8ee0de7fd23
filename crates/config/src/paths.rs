use std::path::{Path, PathBuf};

/// Expand a leading `~` to the current user's home directory.
///
/// Paths without a leading `~` are returned unchanged, as are all paths when
/// no home directory can be determined.
pub fn expand_home(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let Some(home) = home_dir() else {
        return path.to_path_buf();
    };
    expand_home_with(path, &home)
}

fn expand_home_with(path: &Path, home: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) if rest.as_os_str().is_empty() => home.to_path_buf(),
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

pub fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

/// Replace `${NAME}` placeholders with environment variable values.
///
/// Unknown variables and unterminated placeholders are kept verbatim.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) if end > 0 => {
                let name = &after[..end];
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    },
                }
                rest = &after[end + 1..];
            },
            _ => {
                out.push_str("${");
                rest = after;
            },
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        (name == "SKILLS_HOME").then(|| "/data".to_string())
    }

    #[test]
    fn tilde_alone_is_home() {
        assert_eq!(
            expand_home_with(Path::new("~"), Path::new("/home/u")),
            PathBuf::from("/home/u")
        );
    }

    #[test]
    fn tilde_prefix_joins_home() {
        assert_eq!(
            expand_home_with(Path::new("~/.claude/skills"), Path::new("/home/u")),
            PathBuf::from("/home/u/.claude/skills")
        );
    }

    #[test]
    fn absolute_path_untouched() {
        assert_eq!(
            expand_home_with(Path::new("/etc/skills"), Path::new("/home/u")),
            PathBuf::from("/etc/skills")
        );
    }

    #[test]
    fn tilde_user_form_untouched() {
        assert_eq!(
            expand_home_with(Path::new("~other/skills"), Path::new("/home/u")),
            PathBuf::from("~other/skills")
        );
    }

    #[test]
    fn substitutes_known_variable() {
        assert_eq!(
            substitute_env_with("dir = \"${SKILLS_HOME}/skills\"", lookup),
            "dir = \"/data/skills\""
        );
    }

    #[test]
    fn keeps_unknown_and_malformed_placeholders() {
        assert_eq!(substitute_env_with("${NOPE}", lookup), "${NOPE}");
        assert_eq!(substitute_env_with("a ${} b", lookup), "a ${} b");
        assert_eq!(substitute_env_with("tail ${OPEN", lookup), "tail ${OPEN");
    }
}
