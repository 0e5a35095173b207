use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};

/// Capture group names recognised in extraction patterns, with the quote
/// character whose escapes get removed from the captured text.
const QUOTED_GROUPS: [(&str, char); 3] = [("dq", '"'), ("sq", '\''), ("bq", '`')];

/// Group holding an unquoted ("bare-brace") message, optionally paired with a
/// `quote` group naming the quote character.
const MESSAGE_GROUP: &str = "msg";
const QUOTE_GROUP: &str = "quote";

/// Maps a file extension to the ordered list of extraction patterns applied to
/// files with that extension.
///
/// Patterns are stored as source text; they are only compiled (and therefore
/// only rejected) when [`PatternRegistry::compile`] runs ahead of an
/// extraction pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternRegistry {
    patterns: BTreeMap<String, Vec<String>>,
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `patterns` to the list of every extension in `extensions`.
    pub fn add_patterns<E, P>(&mut self, extensions: E, patterns: P)
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let patterns: Vec<String> = patterns
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect();

        for ext in extensions {
            self.patterns
                .entry(ext.as_ref().to_string())
                .or_default()
                .extend(patterns.iter().cloned());
        }
    }

    pub fn get_patterns(&self, extension: &str) -> &[String] {
        self.patterns
            .get(extension)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.patterns.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.values().all(Vec::is_empty)
    }

    /// Append every pattern of `other` after the ones already registered.
    pub fn extend_from(&mut self, other: &PatternRegistry) {
        for (ext, patterns) in &other.patterns {
            self.add_patterns([ext], patterns);
        }
    }

    /// Compile every registered pattern. Any malformed pattern fails the whole
    /// registry so that nothing is extracted with a partial pattern set.
    pub fn compile(&self) -> Result<CompiledPatterns> {
        let mut compiled = HashMap::new();

        for (ext, patterns) in &self.patterns {
            let mut regexes = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let regex = Regex::new(pattern).map_err(|e| Error::Extraction {
                    extension: ext.clone(),
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;

                let has_message_group = regex.capture_names().flatten().any(|name| {
                    name == MESSAGE_GROUP || QUOTED_GROUPS.iter().any(|(g, _)| *g == name)
                });
                if !has_message_group {
                    return Err(Error::Extraction {
                        extension: ext.clone(),
                        pattern: pattern.clone(),
                        message: "pattern has no `msg`, `dq`, `sq` or `bq` capture group"
                            .to_string(),
                    });
                }

                regexes.push(regex);
            }
            compiled.insert(ext.clone(), regexes);
        }

        Ok(CompiledPatterns { patterns: compiled })
    }

    /// The built-in registry used when a project adds nothing of its own.
    pub fn defaults() -> Self {
        let mut registry = Self::new();

        registry.add_patterns(
            ["js"],
            [
                format!(
                    r"(?:toastError|toastErrorRetry)\(tr\({}\)",
                    quoted_literal(&['"', '\''])
                ),
                format!(r"\s+tr\({}", quoted_literal(&['`', '\'', '"'])),
            ],
        );

        registry.add_patterns(
            ["jsx"],
            [
                format!(
                    r"(?:^|[^A-Za-z0-9_$])tr\({}",
                    quoted_literal(&['`', '\'', '"'])
                ),
                format!(
                    r"(?:title|placeholder|action|successMessage|errorMessage)={}",
                    quoted_literal(&['`', '\'', '"'])
                ),
            ],
        );

        registry.add_patterns(
            ["php"],
            [format!(
                r"\b(?:tr|messageResponse)\({}",
                quoted_literal(&['\'', '"'])
            )],
        );

        registry
    }
}

/// Regex fragment matching one string literal delimited by any of `quotes`.
///
/// Each quote style captures into its own named group (`dq`, `sq`, `bq`), so the
/// closing quote always matches the opening one without backreferences.
pub fn quoted_literal(quotes: &[char]) -> String {
    let alternatives: Vec<String> = quotes
        .iter()
        .filter_map(|q| {
            QUOTED_GROUPS
                .iter()
                .find(|(_, quote)| quote == q)
                .map(|(group, quote)| {
                    format!(r"{quote}(?P<{group}>(?:[^{quote}\\]|\\.)*){quote}")
                })
        })
        .collect();

    format!("(?:{})", alternatives.join("|"))
}

/// Registry patterns after successful compilation.
#[derive(Debug, Clone, Default)]
pub struct CompiledPatterns {
    patterns: HashMap<String, Vec<Regex>>,
}

impl CompiledPatterns {
    pub fn for_extension(&self, extension: &str) -> &[Regex] {
        self.patterns
            .get(extension)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every non-empty message matched in `content`, in pattern order then
    /// match order, unescaped for the quote it was written with.
    pub fn find_messages(&self, extension: &str, content: &str) -> Vec<String> {
        let mut messages = Vec::new();

        for regex in self.for_extension(extension) {
            for caps in regex.captures_iter(content) {
                let Some((quote, raw)) = message_capture(&caps) else {
                    continue;
                };
                let message = unescape_quote(raw, quote);
                if !message.is_empty() {
                    messages.push(message);
                }
            }
        }

        messages
    }
}

fn message_capture<'h>(caps: &Captures<'h>) -> Option<(Option<char>, &'h str)> {
    for (group, quote) in QUOTED_GROUPS {
        if let Some(m) = caps.name(group) {
            return Some((Some(quote), m.as_str()));
        }
    }

    let message = caps.name(MESSAGE_GROUP)?;
    let quote = caps
        .name(QUOTE_GROUP)
        .and_then(|q| q.as_str().chars().next());
    Some((quote, message.as_str()))
}

/// Only escapes of the quote that delimited the literal are removed.
fn unescape_quote(text: &str, quote: Option<char>) -> String {
    match quote {
        Some('"') => text.replace("\\\"", "\""),
        Some('\'') => text.replace("\\'", "'"),
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_patterns_appends_for_each_extension() {
        let mut registry = PatternRegistry::new();
        registry.add_patterns(["js", "ts"], ["a"]);
        registry.add_patterns(["js"], ["b", "c"]);

        assert_eq!(registry.get_patterns("js"), ["a", "b", "c"]);
        assert_eq!(registry.get_patterns("ts"), ["a"]);
        assert!(registry.get_patterns("rs").is_empty());
    }

    #[test]
    fn test_invalid_pattern_fails_compilation() {
        let mut registry = PatternRegistry::new();
        registry.add_patterns(["js"], [r"tr\((?P<dq>[^)]*)\)", r"tr\((?P<dq>"]);

        let err = registry.compile().unwrap_err();
        assert!(matches!(err, Error::Extraction { ref extension, .. } if extension == "js"));
    }

    #[test]
    fn test_pattern_without_message_group_is_rejected() {
        let mut registry = PatternRegistry::new();
        registry.add_patterns(["js"], [r"tr\(([^)]*)\)"]);

        assert!(registry.compile().is_err());
    }

    #[test]
    fn test_defaults_compile() {
        let compiled = PatternRegistry::defaults().compile().unwrap();
        assert_eq!(compiled.for_extension("js").len(), 2);
        assert_eq!(compiled.for_extension("jsx").len(), 2);
        assert_eq!(compiled.for_extension("php").len(), 1);
    }

    #[test]
    fn test_js_default_patterns() {
        let compiled = PatternRegistry::defaults().compile().unwrap();
        let source = r#"
            const a = tr("Save \"draft\"");
            toastError(tr('Could not save'));
            const b = tr(`Template`);
            const c = attr('not a message');
        "#;

        let messages = compiled.find_messages("js", source);
        assert_eq!(
            messages,
            vec!["Could not save", "Save \"draft\"", "Template"]
        );
    }

    #[test]
    fn test_unescape_only_matching_quote() {
        let compiled = PatternRegistry::defaults().compile().unwrap();
        let source = r#"echo tr('It\'s a \"test\"');"#;

        let messages = compiled.find_messages("php", source);
        assert_eq!(messages, vec![r#"It's a \"test\""#]);
    }

    #[test]
    fn test_jsx_attributes_and_calls() {
        let compiled = PatternRegistry::defaults().compile().unwrap();
        let source = r#"<Input placeholder="Your name" title={tr('Name')} />"#;

        let messages = compiled.find_messages("jsx", source);
        assert!(messages.contains(&"Your name".to_string()));
        assert!(messages.contains(&"Name".to_string()));
    }

    #[test]
    fn test_bare_brace_message_group() {
        let mut registry = PatternRegistry::new();
        registry.add_patterns(["tpl"], [r"\{t\}(?P<msg>.*?)\{/t\}"]);
        let compiled = registry.compile().unwrap();

        let messages = compiled.find_messages("tpl", "<p>{t}Welcome back{/t}</p>{t}{/t}");
        assert_eq!(messages, vec!["Welcome back"]);
    }

    #[test]
    fn test_extend_from_appends() {
        let mut base = PatternRegistry::defaults();
        let mut extra = PatternRegistry::new();
        extra.add_patterns(["js"], [r"i18n\((?P<dq>[^\x22]*)\)"]);

        base.extend_from(&extra);
        assert_eq!(base.get_patterns("js").len(), 3);
    }
}
