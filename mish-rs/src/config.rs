//! `mishrc` configuration file parser.
//!
//! | Directive | Action |
//! |-----------|--------|
//! | `/set <option>=<value>` or `/set <option> <value>` | set an option |
//! | `/let <name>=<value>` or `/let <name> <value>` | pre-bind a script variable |
//! | Lines starting with `;` or `#` | comment, ignored |
//! | Any other `/command` | silently skipped |
//!
//! Options: `scripts_dir`, `extension`, `unclosed` (`reject`, `flatten` or
//! `truncate`).

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::library::{self, DEFAULT_EXTENSION};
use crate::script::{ExpandOptions, UnclosedBlock};
use crate::var::Environment;

// ── Public API ────────────────────────────────────────────────────────────────

/// A non-fatal error encountered while loading a config file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ConfigError {
    pub line: usize,
    pub message: String,
}

/// Settings loaded from an rc file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub scripts_dir: Option<PathBuf>,
    pub extension: String,
    pub unclosed: UnclosedBlock,
    /// Bindings copied into the environment of every run.
    pub vars: Environment,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scripts_dir: None,
            extension: DEFAULT_EXTENSION.to_owned(),
            unclosed: UnclosedBlock::default(),
            vars: Environment::new(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expand_options(&self) -> ExpandOptions {
        ExpandOptions { unclosed: self.unclosed }
    }

    /// Parse an rc string.
    ///
    /// Unknown directives are skipped.  Returns the config and a list of any
    /// errors on recognised lines; those lines leave the config unchanged.
    pub fn load_str(s: &str) -> (Self, Vec<ConfigError>) {
        let mut config = Config::new();
        let mut errors = Vec::new();

        for (i, raw) in s.lines().enumerate() {
            let lineno = i + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            let Some(rest) = line.strip_prefix('/') else { continue };

            let (cmd, args_str) = rest
                .split_once(|c: char| c.is_ascii_whitespace())
                .unwrap_or((rest, ""));
            let tokens = split_args(args_str.trim());

            let result = match cmd {
                "set" => parse_assignment("/set", &tokens)
                    .and_then(|(name, value)| config.apply_option(&name, value)),
                "let" => parse_assignment("/let", &tokens).map(|(name, value)| {
                    config.vars.set(name, value);
                }),
                _ => Ok(()),
            };
            if let Err(message) = result {
                errors.push(ConfigError { line: lineno, message });
            }
        }

        (config, errors)
    }

    /// Read and parse an rc file from disk.
    pub fn load_file(path: &Path) -> std::io::Result<(Self, Vec<ConfigError>)> {
        let s = std::fs::read_to_string(path)?;
        Ok(Self::load_str(&s))
    }

    fn apply_option(&mut self, name: &str, value: String) -> Result<(), String> {
        match name {
            "scripts_dir" => self.scripts_dir = Some(PathBuf::from(value)),
            "extension" => {
                let ext = value.trim_start_matches('.');
                if ext.is_empty() {
                    return Err("/set: extension cannot be empty".into());
                }
                self.extension = ext.to_owned();
            }
            "unclosed" => self.unclosed = value.parse().map_err(|e| format!("/set: {e}"))?,
            other => return Err(format!("/set: unknown option '{other}'")),
        }
        Ok(())
    }
}

/// Default rc location: `<config dir>/mishrc`.
pub fn default_path() -> Option<PathBuf> {
    library::config_dir().map(|d| d.join("mishrc"))
}

// ── Argument tokenizer ────────────────────────────────────────────────────────

/// Split `s` into whitespace-separated words.  `"…"` and `'…'` sections keep
/// their whitespace and may be empty; inside them `\` takes the next
/// character literally.
fn split_args(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut word: Option<String> = None;
    let mut quote: Option<char> = None;
    let mut chars = s.chars();

    while let Some(ch) = chars.next() {
        match (quote, ch) {
            (Some(_), '\\') => {
                if let Some(next) = chars.next() {
                    word.get_or_insert_with(String::new).push(next);
                }
            }
            (Some(q), c) if c == q => quote = None,
            (None, '"' | '\'') => {
                quote = Some(ch);
                word.get_or_insert_with(String::new);
            }
            (None, c) if c.is_whitespace() => words.extend(word.take()),
            (_, c) => word.get_or_insert_with(String::new).push(c),
        }
    }
    words.extend(word);
    words
}

// ── /set and /let ─────────────────────────────────────────────────────────────

/// Parse `<name>=<value>` or `<name> <value…>`.
fn parse_assignment(cmd: &str, tokens: &[String]) -> Result<(String, String), String> {
    if tokens.is_empty() {
        return Err(format!("{cmd}: requires an argument"));
    }

    let (name, value) = if let Some((name, value)) = tokens[0].split_once('=') {
        let mut value = value.to_owned();
        for extra in &tokens[1..] {
            value.push(' ');
            value.push_str(extra);
        }
        (name.to_owned(), value)
    } else if tokens.len() >= 2 {
        (tokens[0].clone(), tokens[1..].join(" "))
    } else {
        return Err(format!("{cmd}: missing value for '{}'", tokens[0]));
    };

    if name.is_empty() {
        return Err(format!("{cmd}: name cannot be empty"));
    }

    Ok((name, value))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // -- split_args -----------------------------------------------------------

    #[test]
    fn split_simple() {
        assert_eq!(split_args("foo bar baz"), ["foo", "bar", "baz"]);
    }

    #[test]
    fn split_quoted_spaces() {
        assert_eq!(split_args(r#""My Scripts" x"#), ["My Scripts", "x"]);
    }

    #[test]
    fn split_escaped_quote_inside_quotes() {
        assert_eq!(split_args(r#""say \"hi\"""#), [r#"say "hi""#]);
    }

    #[test]
    fn split_single_quotes_and_empty_words() {
        assert_eq!(split_args(r#"a 'b "c"' "" d"#), ["a", r#"b "c""#, "", "d"]);
    }

    #[test]
    fn split_backslash_outside_quotes_is_literal() {
        assert_eq!(split_args(r"C:\mish\scripts"), [r"C:\mish\scripts"]);
    }

    // -- /set -----------------------------------------------------------------

    #[test]
    fn defaults() {
        let (cfg, errs) = Config::load_str("");
        assert!(errs.is_empty());
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.extension, "mish");
        assert_eq!(cfg.unclosed, UnclosedBlock::Reject);
    }

    #[test]
    fn set_equals_syntax() {
        let (cfg, errs) = Config::load_str("/set scripts_dir=/srv/mish");
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.scripts_dir, Some(PathBuf::from("/srv/mish")));
    }

    #[test]
    fn set_space_syntax_with_quotes() {
        let (cfg, errs) = Config::load_str(r#"/set scripts_dir "/home/me/My Scripts""#);
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.scripts_dir, Some(PathBuf::from("/home/me/My Scripts")));
    }

    #[test]
    fn set_extension_strips_dot() {
        let (cfg, errs) = Config::load_str("/set extension .txt");
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.extension, "txt");
    }

    #[test]
    fn set_unclosed_policy() {
        let (cfg, errs) = Config::load_str("/set unclosed=flatten");
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.expand_options().unclosed, UnclosedBlock::Flatten);
    }

    #[test]
    fn bad_values_are_errors() {
        let (cfg, errs) = Config::load_str(
            "/set unclosed=sometimes\n\
             /set colour=red\n\
             /set extension=\n\
             /set\n\
             /set lonely",
        );
        assert_eq!(errs.len(), 5, "{errs:?}");
        assert_eq!(errs[0].line, 1);
        assert!(errs[1].to_string().contains("unknown option 'colour'"));
        assert_eq!(cfg, Config::default());
    }

    // -- /let -----------------------------------------------------------------

    #[test]
    fn let_binds_variables() {
        let (cfg, errs) = Config::load_str("/let target=bob\n/let greeting hello there");
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.vars.get("target"), Some("bob"));
        assert_eq!(cfg.vars.get("greeting"), Some("hello there"));
    }

    #[test]
    fn let_value_keeps_equals_and_spaces() {
        let (cfg, errs) = Config::load_str("/let cmd=give @p a=b c");
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.vars.get("cmd"), Some("give @p a=b c"));
    }

    #[test]
    fn let_empty_value() {
        let (cfg, errs) = Config::load_str("/let blank=");
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.vars.get("blank"), Some(""));
    }

    #[test]
    fn let_quoted_empty_value() {
        let (cfg, errs) = Config::load_str(r#"/let blank """#);
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.vars.get("blank"), Some(""));
    }

    #[test]
    fn let_empty_name_is_error() {
        let (_, errs) = Config::load_str("/let =x");
        assert_eq!(errs.len(), 1);
    }

    // -- Comments & skipping --------------------------------------------------

    #[test]
    fn comments_and_blank_lines_ignored() {
        let (cfg, errs) = Config::load_str(
            ";; comment\n\
             # also a comment\n\
             \n\
             /let real=yes",
        );
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.vars.len(), 1);
    }

    #[test]
    fn unknown_commands_silently_skipped() {
        let (cfg, errs) = Config::load_str("/bind F1 = /say hi\nplain text\n/let loaded=yes");
        assert!(errs.is_empty(), "{errs:?}");
        assert!(cfg.vars.contains("loaded"));
    }

    #[test]
    fn load_file_from_disk() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut f, b"/set unclosed truncate\n").unwrap();
        let (cfg, errs) = Config::load_file(f.path()).unwrap();
        assert!(errs.is_empty());
        assert_eq!(cfg.unclosed, UnclosedBlock::Truncate);
    }
}
