use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, error, info, warn};

use crate::catalog::{Catalog, MessageEntry};
use crate::config::Project;
use crate::error::Result;
use crate::fs::FileSystem;
use crate::locale;
use crate::msgformat::{IcuMessageFormatter, MessageFormatter};

pub const LOCALE_EXTENSION: &str = "po";

/// Outcome of checking one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validity {
    /// Nothing translated yet.
    NotApplicable,
    Valid,
    Invalid(ValidationFailure),
}

impl Validity {
    pub fn is_invalid(&self) -> bool {
        matches!(self, Validity::Invalid(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    /// Placeholders of the original that the translation dropped.
    MissingVariables(Vec<String>),
    /// The formatting engine rejected the translation.
    Syntax(String),
}

/// `{name, type, style}` (group 1) or bare `{name}` (group 2)
static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| {
        Regex::new(r"\{\s*([[:alnum:]]+)\s*,(?:[^{}]*|\{[^{}]*\})*\}|\{([[:alnum:]]+)\}")
            .expect("PLACEHOLDER_REGEX pattern is invalid - this is a bug")
    })
}

/// Placeholder names in `text` in order of appearance, without duplicates.
///
/// Both `{name}` and `{name, type, ...}` count; style text may nest braces
/// one level deep.
pub fn find_variable_names(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in get_placeholder_regex().captures_iter(text) {
        if let Some(name) = caps.get(1).or_else(|| caps.get(2)) {
            if !names.iter().any(|n| n == name.as_str()) {
                names.push(name.as_str().to_string());
            }
        }
    }
    names
}

/// Checks translations against their originals' placeholders and the
/// formatting engine.
pub struct Validator {
    formatter: Box<dyn MessageFormatter>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(IcuMessageFormatter)
    }
}

impl Validator {
    pub fn new(formatter: impl MessageFormatter + 'static) -> Self {
        Self {
            formatter: Box::new(formatter),
        }
    }

    pub fn is_valid(&self, locale: &str, entry: &MessageEntry) -> Validity {
        if !entry.is_translated() {
            return Validity::NotApplicable;
        }

        let validity = self.check(locale, entry);
        if let Validity::Invalid(failure) = &validity {
            match failure {
                ValidationFailure::MissingVariables(missing) => {
                    debug!("Missing variables: {}", missing.join(", "))
                }
                ValidationFailure::Syntax(message) => debug!("Got error: {}", message),
            }
            error!(
                "Found invalid translation for {}: {} ==> {}",
                locale,
                entry.original,
                entry.translated_texts().join(" | ")
            );
        }
        validity
    }

    fn check(&self, locale: &str, entry: &MessageEntry) -> Validity {
        let texts = entry.translated_texts();

        let mut expected = find_variable_names(&entry.original);
        if let Some(plural) = &entry.original_plural {
            for name in find_variable_names(plural) {
                if !expected.contains(&name) {
                    expected.push(name);
                }
            }
        }

        // Plural forms may each drop a placeholder; together they must cover all.
        let present: Vec<String> = texts
            .iter()
            .flat_map(|text| find_variable_names(text))
            .collect();
        let missing: Vec<String> = expected
            .iter()
            .filter(|name| !present.contains(name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Validity::Invalid(ValidationFailure::MissingVariables(missing));
        }

        for text in texts {
            if let Err(e) = self.formatter.check(locale, text) {
                return Validity::Invalid(ValidationFailure::Syntax(e.to_string()));
            }
        }

        Validity::Valid
    }

    /// Copy of `catalog` without its invalid entries. Untranslated entries stay.
    pub fn filter_valid_translations(&self, locale: &str, catalog: &Catalog) -> Catalog {
        catalog.filtered(|entry| !self.is_valid(locale, entry).is_invalid())
    }

    /// Number of invalid entries across the catalog.
    pub fn count_invalid(&self, locale: &str, catalog: &Catalog) -> usize {
        catalog
            .entries()
            .filter(|entry| self.is_valid(locale, entry).is_invalid())
            .count()
    }

    /// Validate every `<base>/<domain>/*.po` of the project. Returns the number
    /// of invalid entries found.
    pub fn validate_translations(&self, project: &Project, fs: &dyn FileSystem) -> Result<usize> {
        let mut errors = 0;

        for domain in project.domains() {
            let dir = project.base_dir().join(domain);
            if !fs.exists(&dir) {
                debug!("Ignoring non-existent directory {}", dir.display());
                continue;
            }

            for path in fs.read_dir(&dir)? {
                if path.extension().map_or(true, |ext| ext != LOCALE_EXTENSION) {
                    warn!("Ignoring non-po file {}", path.display());
                    continue;
                }

                let locale = locale_for_file(&path);
                info!("Validating {}/{}", domain, file_name(&path));

                let catalog = Catalog::load_po(&path, domain, Some(locale.clone()))?;
                errors += self.count_invalid(&locale, &catalog);
            }
        }

        Ok(errors)
    }
}

/// Full locale for a `<locale>.po` file. Unknown short codes are kept as-is.
pub fn locale_for_file(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    locale::normalize(&stem).unwrap_or_else(|e| {
        warn!("{}: {}", path.display(), e);
        stem
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
