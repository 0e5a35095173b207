use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::catalog::{filter_fuzzy, Catalog};
use crate::config::{OutputTarget, Project};
use crate::error::{Error, Result};
use crate::fs::FileSystem;
use crate::reverse::{build_reverse, reverse_domain};
use crate::validator::{locale_for_file, Validator, LOCALE_EXTENSION};

/// Filters applied to each locale catalog after every file merged into it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Drop entries the validator rejects.
    pub valid_only: bool,
    /// Keep entries flagged fuzzy.
    pub include_fuzzy: bool,
}

/// One locale catalog ready to be written for a target.
#[derive(Debug, Clone)]
pub struct MergedCatalog<'p> {
    pub target: &'p OutputTarget,
    /// Domain the artifact is named after (`<name>reverse` for reverse maps).
    pub domain: String,
    pub locale: String,
    pub catalog: Catalog,
}

/// Loads and merges on-disk locale catalogs for the targets of one project id.
pub struct TranslationMerger<'a> {
    fs: &'a dyn FileSystem,
    validator: &'a Validator,
    options: MergeOptions,
}

impl<'a> TranslationMerger<'a> {
    pub fn new(fs: &'a dyn FileSystem, validator: &'a Validator, options: MergeOptions) -> Self {
        Self {
            fs,
            validator,
            options,
        }
    }

    /// Every (target, domain, locale) catalog for `project_id`, reverse maps included.
    pub fn merge<'p>(&self, project: &'p Project, project_id: &str) -> Result<Vec<MergedCatalog<'p>>> {
        let mut merged = Vec::new();

        for target in project.outputs() {
            if target.project_id() != project_id {
                debug!("Ignoring non-matching project {}", target.project_id());
                continue;
            }

            for name in target.names() {
                let with_reverse = match project.config(name) {
                    Some(config) => config.with_reverse(),
                    None => {
                        warn!("Config {} not found", name);
                        false
                    }
                };

                let mut dirs = vec![project.base_dir().join(name)];
                if target.primary_name() == Some(name.as_str()) {
                    dirs.extend(target.source_directories().iter().cloned());
                }

                let (locales, reverses) = self.merge_domain(name, &dirs, with_reverse)?;

                for (locale, catalog) in locales {
                    merged.push(MergedCatalog {
                        target,
                        domain: name.clone(),
                        locale,
                        catalog,
                    });
                }
                for (locale, catalog) in reverses {
                    merged.push(MergedCatalog {
                        target,
                        domain: reverse_domain(name),
                        locale,
                        catalog,
                    });
                }
            }
        }

        Ok(merged)
    }

    /// Merge every locale file found in `dirs` for one domain.
    ///
    /// The first file of a locale is adopted whole. Later files only contribute
    /// translated entries, which replace whatever was there.
    pub fn merge_domain(
        &self,
        domain: &str,
        dirs: &[PathBuf],
        with_reverse: bool,
    ) -> Result<(BTreeMap<String, Catalog>, BTreeMap<String, Catalog>)> {
        let mut locales: BTreeMap<String, Catalog> = BTreeMap::new();
        let mut reverses: BTreeMap<String, Catalog> = BTreeMap::new();

        for dir in dirs {
            if !self.fs.exists(dir) {
                warn!("Ignoring non-existent directory {}", dir.display());
                continue;
            }

            for path in self.fs.read_dir(dir)? {
                if !is_locale_file(&path) {
                    warn!("Ignoring non-po file {}", path.display());
                    continue;
                }

                let locale = locale_for_file(&path);
                let loaded = Catalog::load_po(&path, domain, Some(locale.clone()))?;
                debug!("Merging {} into {} / {}", path.display(), locale, domain);

                let current = match locales.remove(&locale) {
                    None => loaded.clone(),
                    Some(mut accumulated) => {
                        for entry in loaded.entries().filter(|e| e.is_translated()) {
                            accumulated.replace(entry.clone());
                        }
                        accumulated
                    }
                };
                locales.insert(locale.clone(), self.apply_filters(&locale, current));

                if with_reverse {
                    if reverses.contains_key(&locale) {
                        return Err(Error::ReverseMapConflict {
                            domain: domain.to_string(),
                            locale,
                        });
                    }
                    reverses.insert(locale, build_reverse(&loaded));
                }
            }
        }

        Ok((locales, reverses))
    }

    fn apply_filters(&self, locale: &str, catalog: Catalog) -> Catalog {
        let catalog = if self.options.valid_only {
            self.validator.filter_valid_translations(locale, &catalog)
        } else {
            catalog
        };

        if self.options.include_fuzzy {
            catalog
        } else {
            filter_fuzzy(&catalog)
        }
    }
}

fn is_locale_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == LOCALE_EXTENSION)
}
