use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::catalog::{Catalog, MessageEntry};
use crate::config::{resolve_path as resolve, ExtractionConfig, HookContext, Phase, Project};
use crate::error::{Error, Result};
use crate::fs::FileSystem;
use crate::patterns::CompiledPatterns;
use crate::scanner;
use crate::vcs::Vcs;

pub const SOURCE_EXTENSION: &str = "pot";

/// Runs the build phase of a [`Project`]: extraction, list and seed loading,
/// then one canonical catalog per domain.
pub struct Aggregator<'a> {
    vcs: &'a dyn Vcs,
    fs: &'a dyn FileSystem,
}

impl<'a> Aggregator<'a> {
    pub fn new(vcs: &'a dyn Vcs, fs: &'a dyn FileSystem) -> Self {
        Self { vcs, fs }
    }

    /// Fill every configuration's entry list, in configuration order.
    pub fn collect(&self, project: &mut Project) -> Result<()> {
        let base_dir = project.base_dir().to_path_buf();
        let mut default_patterns: Option<CompiledPatterns> = None;

        for index in 0..project.configs().len() {
            let overridden = project.configs()[index].patterns().map(|p| p.compile());
            let patterns = match overridden {
                Some(compiled) => compiled?,
                None => {
                    if default_patterns.is_none() {
                        default_patterns = Some(project.patterns().compile()?);
                    }
                    default_patterns.clone().unwrap_or_default()
                }
            };

            let config = &mut project.configs_mut()[index];
            self.collect_config(config, &base_dir, &patterns)?;
        }

        Ok(())
    }

    fn collect_config(
        &self,
        config: &mut ExtractionConfig,
        base_dir: &Path,
        patterns: &CompiledPatterns,
    ) -> Result<()> {
        config.clear_entries();
        let domain = config.name().to_string();

        config.run_hooks(&HookContext {
            domain: &domain,
            phase: Phase::Pre,
            branches: &[],
            project_dir: None,
        })?;

        let mut branches = Vec::new();
        let project_dir = config
            .project_directory()
            .map(|dir| resolve(base_dir, dir));
        if let Some(dir) = &project_dir {
            info!("{}: scanning {}", domain, dir.display());
            branches = scanner::scan_branches(self.vcs, config, dir, patterns)?;
        }

        for list in config.lists().to_vec() {
            let path = resolve(base_dir, &list);
            for entry in self.load_list(&path)? {
                config.add_entry(entry);
            }
        }

        for pot in config.pots().to_vec() {
            let path = resolve(base_dir, &pot);
            let seed = Catalog::load_po(&path, &domain, None)?;
            debug!("{}: adopting {} seed entries from {}", domain, seed.len(), path.display());
            for entry in seed.entries() {
                config.add_entry(entry.clone());
            }
        }

        config.run_hooks(&HookContext {
            domain: &domain,
            phase: Phase::Post,
            branches: &branches,
            project_dir: project_dir.as_deref(),
        })?;

        info!("{}: {} message(s) collected", domain, config.entries().len());
        Ok(())
    }

    /// One untranslated entry per string of a JSON array list, or per
    /// non-empty line of any other list, referencing the list file.
    pub fn load_list(&self, path: &Path) -> Result<Vec<MessageEntry>> {
        let content = self.fs.read_to_string(path)?;
        let reference = path.display().to_string();

        let messages: Vec<String> = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| {
                Error::Configuration(format!("list {} is not a JSON string array: {e}", path.display()))
            })?
        } else {
            content.lines().map(str::to_string).collect()
        };

        Ok(messages
            .into_iter()
            .filter(|m| !m.is_empty())
            .map(|m| MessageEntry::new(m).with_reference(reference.clone()))
            .collect())
    }

    /// Collect everything and build the per-domain catalogs.
    pub fn process(&self, project: &mut Project) -> Result<Vec<Catalog>> {
        self.collect(project)?;
        Ok(build_catalogs(project))
    }

    /// Build the catalogs and write each to `<base>/<domain>.pot`.
    pub fn write_sources(&self, project: &mut Project) -> Result<Vec<PathBuf>> {
        let catalogs = self.process(project)?;
        let mut written = Vec::with_capacity(catalogs.len());

        for catalog in &catalogs {
            let path = project
                .base_dir()
                .join(format!("{}.{SOURCE_EXTENSION}", catalog.domain()));
            info!("Writing {} ({} entries)", path.display(), catalog.len());
            catalog.write_po(&path)?;
            written.push(path);
        }

        Ok(written)
    }
}

/// One catalog per distinct configuration name, created on first use, with
/// entries merged in configuration order then extraction order.
pub fn build_catalogs(project: &Project) -> Vec<Catalog> {
    let mut catalogs: Vec<Catalog> = Vec::new();

    for config in project.configs() {
        let position = catalogs.iter().position(|c| c.domain() == config.name());
        let catalog = match position {
            Some(i) => &mut catalogs[i],
            None => {
                catalogs.push(Catalog::with_utf8_headers(config.name(), None));
                let last = catalogs.len() - 1;
                &mut catalogs[last]
            }
        };

        for entry in config.entries() {
            catalog.add_or_merge(entry.clone());
        }
    }

    catalogs
}
