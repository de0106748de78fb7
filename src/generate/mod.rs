//! Completion script generation
//!
//! Both generators walk a [`CommandDefinition`] depth first, emitting one
//! shell function per level with nested functions placed before the
//! function that dispatches to them.

pub mod bash;
pub mod zsh;

use crate::definition::CommandDefinition;
use crate::error::CompgenError;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Supported target shells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
}

impl Shell {
    /// Name of the file the script is conventionally installed as
    pub fn file_name(&self, prog_name: &str) -> String {
        match self {
            Shell::Bash => format!("{}_completion.bash", prog_name),
            Shell::Zsh => format!("_{}", prog_name),
        }
    }

    /// Generate the completion script for `definition`
    pub fn generate(&self, definition: &CommandDefinition, prog_name: &str) -> String {
        match self {
            Shell::Bash => bash::generate(definition, prog_name),
            Shell::Zsh => zsh::generate(definition, prog_name),
        }
    }
}

impl FromStr for Shell {
    type Err = CompgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bash" => Ok(Shell::Bash),
            "zsh" => Ok(Shell::Zsh),
            other => Err(CompgenError::InvalidShell(other.to_string())),
        }
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shell::Bash => write!(f, "bash"),
            Shell::Zsh => write!(f, "zsh"),
        }
    }
}

/// Shell function identifier for `name`: anything outside `[A-Za-z0-9_]`
/// becomes `_`
pub(crate) fn ident(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Name of the function completing a nested level
pub(crate) fn nested_function(parent: &str, sub_name: &str) -> String {
    format!("{}_{}", parent, ident(sub_name))
}

/// Function names handed out while generating one script.
///
/// Sanitised paths are not injective (`a`/`b_c` and `a_b`/`c`, or `set-url`
/// beside `set_url`), so a name that is already taken gets the first free
/// `_2`, `_3`, ... suffix. Claims follow the depth-first walk, which keeps
/// the result deterministic.
#[derive(Debug, Default)]
pub(crate) struct FunctionNames {
    taken: HashSet<String>,
}

impl FunctionNames {
    pub(crate) fn claim(&mut self, candidate: String) -> String {
        if !self.taken.contains(&candidate) {
            self.taken.insert(candidate.clone());
            return candidate;
        }
        let mut n = 2;
        loop {
            let name = format!("{}_{}", candidate, n);
            if self.taken.insert(name.clone()) {
                return name;
            }
            n += 1;
        }
    }
}

/// Escape text placed inside a single-quoted shell word
pub(crate) fn quote_escape(s: &str) -> String {
    s.replace('\'', r"'\''")
}

/// `s` as one single-quoted shell word, safe from globbing
pub(crate) fn single_quote(s: &str) -> String {
    format!("'{}'", quote_escape(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_from_str() {
        assert_eq!("bash".parse::<Shell>().unwrap(), Shell::Bash);
        assert_eq!("zsh".parse::<Shell>().unwrap(), Shell::Zsh);
        assert!(matches!(
            "fish".parse::<Shell>(),
            Err(CompgenError::InvalidShell(s)) if s == "fish"
        ));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(Shell::Bash.file_name("tool"), "tool_completion.bash");
        assert_eq!(Shell::Zsh.file_name("tool"), "_tool");
    }

    #[test]
    fn test_ident() {
        assert_eq!(ident("my-tool"), "my_tool");
        assert_eq!(ident("a.b:c"), "a_b_c");
        assert_eq!(nested_function("_tool", "set-url"), "_tool_set_url");
    }

    #[test]
    fn test_quote_escape() {
        assert_eq!(quote_escape("don't"), r"don'\''t");
        assert_eq!(single_quote("-?"), "'-?'");
    }

    #[test]
    fn test_function_names_suffix_taken_names() {
        let mut names = FunctionNames::default();
        assert_eq!(names.claim("_app_set_url".to_string()), "_app_set_url");
        assert_eq!(names.claim("_app_set_url".to_string()), "_app_set_url_2");
        assert_eq!(names.claim("_app_set_url".to_string()), "_app_set_url_3");
        assert_eq!(names.claim("_app_set_url_2".to_string()), "_app_set_url_2_2");
    }
}
