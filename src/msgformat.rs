//! ICU-style message pattern checking.
//!
//! Accepts plain text with apostrophe quoting, simple arguments (`{name}`),
//! typed arguments (`{n, number, integer}`, `{d, date, short}`, ...), `choice`,
//! `plural`/`selectordinal` with `offset:` and `#`, and `select`. Patterns are
//! parsed, never rendered. Plural keywords are checked against CLDR categories
//! and the locale's plural rules must be available through `icu_plurals`.

use icu_locid::Locale;
use icu_plurals::{PluralCategory, PluralRules};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("no plural rules for {locale}: {message}")]
    Locale { locale: String, message: String },
}

/// Message-format engine used to check translations.
pub trait MessageFormatter {
    /// Accept `pattern` if the engine could format it for `locale`.
    fn check(&self, locale: &str, pattern: &str) -> Result<(), FormatError>;
}

/// The built-in [`MessageFormatter`].
#[derive(Debug, Default, Clone, Copy)]
pub struct IcuMessageFormatter;

impl MessageFormatter for IcuMessageFormatter {
    fn check(&self, locale: &str, pattern: &str) -> Result<(), FormatError> {
        let parts = parse(pattern)?;

        let mut ordinal = false;
        let mut cardinal = false;
        visit_plurals(&parts, &mut |is_ordinal| {
            if is_ordinal {
                ordinal = true;
            } else {
                cardinal = true;
            }
        });
        if !cardinal && !ordinal {
            return Ok(());
        }

        let data_locale = (&parse_locale(locale)).into();
        let locale_error = |message: String| FormatError::Locale {
            locale: locale.to_string(),
            message,
        };
        if cardinal {
            PluralRules::try_new_cardinal(&data_locale).map_err(|e| locale_error(e.to_string()))?;
        }
        if ordinal {
            PluralRules::try_new_ordinal(&data_locale).map_err(|e| locale_error(e.to_string()))?;
        }
        Ok(())
    }
}

fn parse_locale(tag: &str) -> Locale {
    tag.replace('_', "-").parse().unwrap_or_else(|_| {
        debug!("Unparseable locale {tag}, using root plural rules");
        Locale::UND
    })
}

fn visit_plurals(parts: &[Part], on_plural: &mut dyn FnMut(bool)) {
    for part in parts {
        if let Part::Argument { name, kind } = part {
            match kind {
                ArgKind::Plural { ordinal, cases } => {
                    debug!("Plural argument {name} (ordinal: {ordinal})");
                    on_plural(*ordinal);
                    for (_, body) in cases {
                        visit_plurals(body, on_plural);
                    }
                }
                ArgKind::Select(cases) => {
                    for (_, body) in cases {
                        visit_plurals(body, on_plural);
                    }
                }
                ArgKind::Simple | ArgKind::Typed => {}
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Part {
    Text(String),
    /// `#` inside a plural case.
    Pound,
    Argument { name: String, kind: ArgKind },
}

#[derive(Debug, Clone, PartialEq)]
enum ArgKind {
    Simple,
    /// Typed arguments and `choice`; only their style syntax matters.
    Typed,
    Plural {
        ordinal: bool,
        cases: Vec<(Selector, Vec<Part>)>,
    },
    Select(Vec<(String, Vec<Part>)>),
}

#[derive(Debug, Clone, PartialEq)]
enum Selector {
    Exact(f64),
    Keyword(PluralCategory),
}

const FORMAT_TYPES: &[&str] = &["number", "date", "time", "spellout", "ordinal", "duration"];

fn parse(pattern: &str) -> Result<Vec<Part>, FormatError> {
    let mut parser = Parser {
        chars: pattern.chars().collect(),
        pos: 0,
    };
    parser.message(false, false)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T, FormatError> {
        Err(FormatError::Syntax {
            offset: self.pos,
            message: message.into(),
        })
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), FormatError> {
        if self.peek() == Some(expected) {
            self.pos += 1;
            Ok(())
        } else {
            self.error(format!("expected `{expected}`"))
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.chars.get(self.pos + i) == Some(&c))
    }

    /// Text and arguments up to the end of input, or up to (not past) the `}`
    /// closing a nested message.
    fn message(&mut self, nested: bool, in_plural: bool) -> Result<Vec<Part>, FormatError> {
        let mut parts = Vec::new();
        let mut text = String::new();

        while let Some(c) = self.peek() {
            match c {
                '\'' => {
                    self.pos += 1;
                    self.apostrophe(&mut text, in_plural);
                }
                '{' => {
                    flush(&mut text, &mut parts);
                    parts.push(self.argument()?);
                }
                '}' if nested => {
                    flush(&mut text, &mut parts);
                    return Ok(parts);
                }
                '#' if in_plural => {
                    flush(&mut text, &mut parts);
                    self.pos += 1;
                    parts.push(Part::Pound);
                }
                _ => {
                    text.push(c);
                    self.pos += 1;
                }
            }
        }

        if nested {
            return self.error("unmatched `{`");
        }
        flush(&mut text, &mut parts);
        Ok(parts)
    }

    /// Called just past an apostrophe. `''` is a literal quote; a quote before
    /// a syntax character opens a quoted span running to the next lone quote.
    fn apostrophe(&mut self, text: &mut String, in_plural: bool) {
        match self.peek() {
            Some('\'') => {
                text.push('\'');
                self.pos += 1;
            }
            Some('{' | '}' | '|') => self.quoted_span(text),
            Some('#') if in_plural => self.quoted_span(text),
            _ => text.push('\''),
        }
    }

    fn quoted_span(&mut self, text: &mut String) {
        while let Some(c) = self.peek() {
            self.pos += 1;
            if c == '\'' {
                if self.peek() == Some('\'') {
                    text.push('\'');
                    self.pos += 1;
                } else {
                    return;
                }
            } else {
                text.push(c);
            }
        }
    }

    fn identifier(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn argument(&mut self) -> Result<Part, FormatError> {
        self.expect('{')?;
        self.skip_whitespace();

        let name = self.identifier();
        if name.is_empty() {
            return self.error("bad argument name");
        }
        self.skip_whitespace();

        match self.peek() {
            Some('}') => {
                self.pos += 1;
                return Ok(Part::Argument {
                    name,
                    kind: ArgKind::Simple,
                });
            }
            Some(',') => self.pos += 1,
            _ => return self.error(format!("bad syntax in argument `{name}`")),
        }

        self.skip_whitespace();
        let arg_type = self.identifier().to_ascii_lowercase();
        self.skip_whitespace();

        let kind = match arg_type.as_str() {
            "plural" | "selectordinal" => {
                self.expect(',')?;
                self.plural_style(arg_type == "selectordinal")?
            }
            "select" => {
                self.expect(',')?;
                self.select_style()?
            }
            "choice" => {
                self.expect(',')?;
                let style = self.simple_style()?;
                self.choice_cases(&style)?;
                ArgKind::Typed
            }
            t if FORMAT_TYPES.contains(&t) => match self.peek() {
                Some('}') => {
                    self.pos += 1;
                    ArgKind::Typed
                }
                Some(',') => {
                    self.pos += 1;
                    self.simple_style()?;
                    ArgKind::Typed
                }
                _ => return self.error(format!("bad syntax in argument `{name}`")),
            },
            "" => return self.error(format!("missing type in argument `{name}`")),
            other => return self.error(format!("unknown argument type `{other}`")),
        };

        Ok(Part::Argument { name, kind })
    }

    /// Style text up to the matching `}` (consumed), honouring nested braces
    /// and quoted spans.
    fn simple_style(&mut self) -> Result<String, FormatError> {
        let mut style = String::new();
        let mut depth = 0usize;

        while let Some(c) = self.peek() {
            self.pos += 1;
            match c {
                '\'' => {
                    style.push(c);
                    while let Some(q) = self.peek() {
                        self.pos += 1;
                        style.push(q);
                        if q == '\'' {
                            break;
                        }
                    }
                }
                '{' => {
                    depth += 1;
                    style.push(c);
                }
                '}' if depth == 0 => return Ok(style.trim().to_string()),
                '}' => {
                    depth -= 1;
                    style.push(c);
                }
                _ => style.push(c),
            }
        }

        self.error("unmatched `{` in argument style")
    }

    fn number(&mut self) -> Result<f64, FormatError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.pos += 1;
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        literal
            .parse()
            .or_else(|_| self.error(format!("bad number `{literal}`")))
    }

    fn plural_style(&mut self, ordinal: bool) -> Result<ArgKind, FormatError> {
        let mut cases: Vec<(Selector, Vec<Part>)> = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return self.error("unmatched `{` in plural argument"),
                Some('}') => {
                    self.pos += 1;
                    break;
                }
                _ => {}
            }

            if self.starts_with("offset:") {
                if !cases.is_empty() {
                    return self.error("`offset:` must precede the plural cases");
                }
                self.pos += "offset:".len();
                self.skip_whitespace();
                self.number()?;
                continue;
            }

            let selector = if self.peek() == Some('=') {
                self.pos += 1;
                Selector::Exact(self.number()?)
            } else {
                let keyword = self.identifier();
                if keyword.is_empty() {
                    return self.error("bad plural selector");
                }
                match PluralCategory::get_for_cldr_string(&keyword) {
                    Some(category) => Selector::Keyword(category),
                    None => return self.error(format!("unknown plural keyword `{keyword}`")),
                }
            };
            if cases.iter().any(|(s, _)| *s == selector) {
                return self.error("duplicate plural selector");
            }

            self.skip_whitespace();
            self.expect('{')?;
            let body = self.message(true, true)?;
            self.expect('}')?;
            cases.push((selector, body));
        }

        if !cases
            .iter()
            .any(|(s, _)| *s == Selector::Keyword(PluralCategory::Other))
        {
            return self.error("missing `other` case in plural argument");
        }

        Ok(ArgKind::Plural { ordinal, cases })
    }

    fn select_style(&mut self) -> Result<ArgKind, FormatError> {
        let mut cases: Vec<(String, Vec<Part>)> = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return self.error("unmatched `{` in select argument"),
                Some('}') => {
                    self.pos += 1;
                    break;
                }
                _ => {}
            }

            let keyword = self.identifier();
            if keyword.is_empty() {
                return self.error("bad select selector");
            }
            if cases.iter().any(|(k, _)| *k == keyword) {
                return self.error(format!("duplicate select selector `{keyword}`"));
            }

            self.skip_whitespace();
            self.expect('{')?;
            let body = self.message(true, false)?;
            self.expect('}')?;
            cases.push((keyword, body));
        }

        if !cases.iter().any(|(k, _)| k == "other") {
            return self.error("missing `other` case in select argument");
        }
        Ok(ArgKind::Select(cases))
    }

    /// `0#none|1#one|1<many` style cases. Limits must be ascending.
    fn choice_cases(&self, style: &str) -> Result<(), FormatError> {
        let mut previous = f64::NEG_INFINITY;
        let mut count = 0usize;

        for segment in style.split('|') {
            let Some(split) = segment.find(['#', '<', '\u{2264}']) else {
                return self.error(format!("bad choice case `{segment}`"));
            };
            let limit_text = segment[..split].trim();
            let limit = match limit_text {
                "\u{221e}" => f64::INFINITY,
                "-\u{221e}" => f64::NEG_INFINITY,
                text => match text.parse() {
                    Ok(n) => n,
                    Err(_) => return self.error(format!("bad choice limit `{text}`")),
                },
            };
            if limit < previous {
                return self.error("choice limits must be ascending");
            }
            previous = limit;
            count += 1;
        }

        if count == 0 {
            return self.error("empty choice style");
        }
        Ok(())
    }
}

fn flush(text: &mut String, parts: &mut Vec<Part>) {
    if !text.is_empty() {
        parts.push(Part::Text(std::mem::take(text)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(locale: &str, pattern: &str) -> Result<(), FormatError> {
        IcuMessageFormatter.check(locale, pattern)
    }

    #[test]
    fn test_plain_and_simple_arguments() {
        assert!(check("en-GB", "Hello {name}, you are {age} ({ratio})").is_ok());
        assert!(check("en", "a } b").is_ok());
        assert!(check("en", "Ticket #{id}").is_ok());
    }

    #[test]
    fn test_apostrophe_quoting() {
        assert!(check("en", "It''s '{literal}' and don't").is_ok());
        assert!(check("en", "'{'unclosed").is_ok());
    }

    #[test]
    fn test_plural_forms() {
        assert!(check("en-GB", "{count, plural, one{# item} other{# items}}").is_ok());
        assert!(check(
            "en",
            "{n, plural, offset:1 =0{nobody} =1{just you} one{you and # other} other{you and # others}}"
        )
        .is_ok());
        assert!(check("pl-PL", "{n, plural, one{1} few{2} many{5} other{x}}").is_ok());
        assert!(check("en-GB", "{n, selectordinal, one{#st} two{#nd} few{#rd} other{#th}}").is_ok());
    }

    #[test]
    fn test_select_and_nested_plural() {
        let pattern = "{gender, select, female{{n, plural, one{her item} other{her # items}}} other{their stuff}}";
        assert!(check("en", pattern).is_ok());
    }

    #[test]
    fn test_typed_arguments_and_choice() {
        assert!(check(
            "de-DE",
            "{a, number} {b, number, integer} {c, date, short} {d, number, '{'#'}'}"
        )
        .is_ok());
        assert!(check("en", "{n, choice, 0#no files|1#one file|1<many files}").is_ok());
    }

    #[test]
    fn test_syntax_errors() {
        for pattern in [
            "Hello {name",
            "Hello {}",
            "{n, plural, one{# item}}",
            "{n, plural, one{a} one{b} other{c}}",
            "{n, plural, lots{a} other{b}}",
            "{g, select, male{he}}",
            "{n, currency}",
            "{n, plural, other{unclosed}",
            "{n, choice, nonsense}",
            "{n, choice, 2#two|1#one}",
            "{n number}",
        ] {
            assert!(
                matches!(check("en", pattern), Err(FormatError::Syntax { .. })),
                "pattern {pattern:?} should not parse"
            );
        }
    }

    #[test]
    fn test_unknown_locale_uses_root_rules() {
        assert!(check("xx-XX", "{n, plural, one{one} other{other}}").is_ok());
        assert!(check("not a locale!", "{n, plural, other{#}}").is_ok());
    }
}
