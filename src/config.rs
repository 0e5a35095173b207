use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::catalog::MessageEntry;
use crate::error::{Error, Result};
use crate::patterns::PatternRegistry;
use crate::process;

pub const DEFAULT_CONFIG_FILE: &str = "gettext-turbo.json";

/// Lifecycle phase at which an extraction hook runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Before any source is scanned or loaded.
    Pre,
    /// After branches, lists and seed catalogs were loaded.
    Post,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Pre => "pre",
            Phase::Post => "post",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a hook gets to see. Branches and project directory are only
/// resolved for [`Phase::Post`].
#[derive(Debug, Clone, Copy)]
pub struct HookContext<'a> {
    pub domain: &'a str,
    pub phase: Phase,
    pub branches: &'a [String],
    pub project_dir: Option<&'a Path>,
}

pub type Hook = Box<dyn Fn(&HookContext<'_>) -> Result<()>>;

/// One named unit of extraction work. The name is the catalog domain.
pub struct ExtractionConfig {
    name: String,
    project_directory: Option<PathBuf>,
    branches: Vec<String>,
    includes: Vec<Regex>,
    excludes: Vec<Regex>,
    lists: Vec<PathBuf>,
    pots: Vec<PathBuf>,
    patterns: Option<PatternRegistry>,
    with_reverse: bool,
    hooks: Vec<(Phase, Hook)>,
    entries: Vec<MessageEntry>,
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("name", &self.name)
            .field("project_directory", &self.project_directory)
            .field("branches", &self.branches)
            .field("includes", &self.includes)
            .field("excludes", &self.excludes)
            .field("lists", &self.lists)
            .field("pots", &self.pots)
            .field("patterns", &self.patterns)
            .field("with_reverse", &self.with_reverse)
            .field("hooks", &self.hooks.len())
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl ExtractionConfig {
    pub fn builder(name: impl Into<String>) -> ExtractionConfigBuilder {
        ExtractionConfigBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn project_directory(&self) -> Option<&Path> {
        self.project_directory.as_deref()
    }

    pub fn branches(&self) -> &[String] {
        &self.branches
    }

    pub fn lists(&self) -> &[PathBuf] {
        &self.lists
    }

    pub fn pots(&self) -> &[PathBuf] {
        &self.pots
    }

    /// Registry overriding the project's for this configuration.
    pub fn patterns(&self) -> Option<&PatternRegistry> {
        self.patterns.as_ref()
    }

    pub fn with_reverse(&self) -> bool {
        self.with_reverse
    }

    /// Exclude filters win. With includes present, a path must match one of them.
    pub fn accepts_path(&self, path: &str) -> bool {
        if self.excludes.iter().any(|re| re.is_match(path)) {
            return false;
        }
        self.includes.is_empty() || self.includes.iter().any(|re| re.is_match(path))
    }

    /// Run every hook registered for `context.phase`, in registration order.
    pub fn run_hooks(&self, context: &HookContext<'_>) -> Result<()> {
        for (_, hook) in self.hooks.iter().filter(|(p, _)| *p == context.phase) {
            hook(context)?;
        }
        Ok(())
    }

    pub fn add_entry(&mut self, entry: MessageEntry) {
        self.entries.push(entry);
    }

    /// Entries extracted so far, in extraction order, not yet deduplicated.
    pub fn entries(&self) -> &[MessageEntry] {
        &self.entries
    }

    pub fn clear_entries(&mut self) {
        self.entries.clear();
    }
}

/// Builder for [`ExtractionConfig`]. Filters are compiled in [`build`](Self::build).
pub struct ExtractionConfigBuilder {
    name: String,
    project_directory: Option<PathBuf>,
    branches: Vec<String>,
    includes: Vec<String>,
    excludes: Vec<String>,
    lists: Vec<PathBuf>,
    pots: Vec<PathBuf>,
    patterns: Option<PatternRegistry>,
    with_reverse: bool,
    hooks: Vec<(Phase, Hook)>,
}

impl ExtractionConfigBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project_directory: None,
            branches: Vec::new(),
            includes: Vec::new(),
            excludes: Vec::new(),
            lists: Vec::new(),
            pots: Vec::new(),
            patterns: None,
            with_reverse: false,
            hooks: Vec::new(),
        }
    }

    pub fn project_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_directory = Some(dir.into());
        self
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branches.push(branch.into());
        self
    }

    pub fn branches<I, S>(mut self, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.branches.extend(branches.into_iter().map(Into::into));
        self
    }

    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.includes.push(pattern.into());
        self
    }

    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.excludes.push(pattern.into());
        self
    }

    /// Static string list: a JSON array, or one message per line.
    pub fn list(mut self, path: impl Into<PathBuf>) -> Self {
        self.lists.push(path.into());
        self
    }

    /// Seed catalog whose entries are adopted as-is.
    pub fn pot(mut self, path: impl Into<PathBuf>) -> Self {
        self.pots.push(path.into());
        self
    }

    pub fn patterns(mut self, patterns: PatternRegistry) -> Self {
        self.patterns = Some(patterns);
        self
    }

    pub fn with_reverse(mut self, enabled: bool) -> Self {
        self.with_reverse = enabled;
        self
    }

    pub fn hook<F>(mut self, phase: Phase, handler: F) -> Self
    where
        F: Fn(&HookContext<'_>) -> Result<()> + 'static,
    {
        self.hooks.push((phase, Box::new(handler)));
        self
    }

    pub fn build(self) -> Result<ExtractionConfig> {
        if self.name.trim().is_empty() {
            return Err(Error::Configuration(
                "extraction config needs a non-empty name".to_string(),
            ));
        }

        let includes = compile_filters(&self.name, "include", &self.includes)?;
        let excludes = compile_filters(&self.name, "exclude", &self.excludes)?;

        Ok(ExtractionConfig {
            name: self.name,
            project_directory: self.project_directory,
            branches: self.branches,
            includes,
            excludes,
            lists: self.lists,
            pots: self.pots,
            patterns: self.patterns,
            with_reverse: self.with_reverse,
            hooks: self.hooks,
            entries: Vec::new(),
        })
    }
}

fn compile_filters(name: &str, kind: &str, patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| {
                Error::Configuration(format!("{name}: invalid {kind} filter `{p}`: {e}"))
            })
        })
        .collect()
}

/// Kind of artifact an [`OutputTarget`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactType {
    /// Compiled gettext catalog (`.mo`)
    Mo,
    /// `export default {..}` JSON module (`.js`)
    Js,
    /// Java resource bundle classes built by `msgfmt --java2`
    Java,
}

impl ArtifactType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactType::Mo => "mo",
            ArtifactType::Js => "js",
            ArtifactType::Java => "java",
        }
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where and how translated catalogs for one or more domains are published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    names: Vec<String>,
    artifact: ArtifactType,
    project_id: String,
    directory: PathBuf,
    namespace: Option<String>,
    source_directories: Vec<PathBuf>,
}

impl OutputTarget {
    pub fn new<I, S>(
        names: I,
        artifact: ArtifactType,
        project_id: impl Into<String>,
        directory: impl Into<PathBuf>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            artifact,
            project_id: project_id.into(),
            directory: directory.into(),
            namespace: None,
            source_directories: Vec::new(),
        }
    }

    /// Package prefix for compiled Java classes.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn add_source_directory(&mut self, dir: impl Into<PathBuf>) {
        self.source_directories.push(dir.into());
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The first name. Extra source directories belong to it.
    pub fn primary_name(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }

    pub fn artifact(&self) -> ArtifactType {
        self.artifact
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn source_directories(&self) -> &[PathBuf] {
        &self.source_directories
    }

    fn validate(&self) -> Result<()> {
        if self.names.is_empty() {
            return Err(Error::Configuration(format!(
                "output for project {} names no domain",
                self.project_id
            )));
        }
        if self.artifact == ArtifactType::Java && self.namespace.is_none() {
            return Err(Error::Configuration(format!(
                "java output for {} needs a javaPackage",
                self.names.join(", ")
            )));
        }
        Ok(())
    }
}

/// Root aggregate: everything one invocation works on.
#[derive(Debug)]
pub struct Project {
    base_dir: PathBuf,
    configs: Vec<ExtractionConfig>,
    outputs: Vec<OutputTarget>,
    patterns: PatternRegistry,
}

impl Project {
    /// Empty project using the built-in pattern registry.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            configs: Vec::new(),
            outputs: Vec::new(),
            patterns: PatternRegistry::defaults(),
        }
    }

    /// Load `config_file` (relative paths are taken from `base_dir`).
    pub fn load(base_dir: &Path, config_file: &Path) -> Result<Self> {
        if !base_dir.is_dir() {
            return Err(Error::Configuration(format!(
                "base directory {} does not exist",
                base_dir.display()
            )));
        }

        let path = if config_file.is_absolute() {
            config_file.to_path_buf()
        } else {
            base_dir.join(config_file)
        };
        if !path.is_file() {
            return Err(Error::Configuration(format!(
                "config file {} does not exist",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(&path)?;
        let file = ProjectFile::parse(&content, &path)?;
        debug!(
            "Loaded {} with {} config(s) and {} output(s)",
            path.display(),
            file.configs.len(),
            file.outputs.len()
        );
        file.into_project(base_dir)
    }

    pub fn add_config(&mut self, config: ExtractionConfig) {
        self.configs.push(config);
    }

    pub fn add_output(&mut self, output: OutputTarget) -> Result<()> {
        output.validate()?;
        self.outputs.push(output);
        Ok(())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn configs(&self) -> &[ExtractionConfig] {
        &self.configs
    }

    pub fn configs_mut(&mut self) -> &mut [ExtractionConfig] {
        &mut self.configs
    }

    pub fn config(&self, name: &str) -> Option<&ExtractionConfig> {
        self.configs.iter().find(|c| c.name() == name)
    }

    pub fn outputs(&self) -> &[OutputTarget] {
        &self.outputs
    }

    pub fn patterns(&self) -> &PatternRegistry {
        &self.patterns
    }

    pub fn patterns_mut(&mut self) -> &mut PatternRegistry {
        &mut self.patterns
    }

    /// Absolute paths pass through; anything else is taken from the base directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        resolve_path(&self.base_dir, path)
    }

    /// Distinct configuration names in first-seen order.
    pub fn domains(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for config in &self.configs {
            if !names.contains(&config.name()) {
                names.push(config.name());
            }
        }
        names
    }
}

pub fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// On-disk project configuration
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectFile {
    /// Extra patterns appended to the built-in registry
    #[serde(default)]
    pub patterns: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub configs: Vec<ConfigEntry>,

    #[serde(default)]
    pub outputs: Vec<OutputEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigEntry {
    pub name: String,
    pub project_directory: Option<PathBuf>,
    #[serde(default)]
    pub branches: Vec<String>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub lists: Vec<PathBuf>,
    #[serde(default)]
    pub pots: Vec<PathBuf>,
    /// Replaces the project registry for this config when present
    pub patterns: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default)]
    pub with_reverse: bool,
    /// Commands (argv lists) per phase
    #[serde(default)]
    pub hooks: BTreeMap<Phase, Vec<Vec<String>>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OutputEntry {
    pub names: Vec<String>,
    #[serde(rename = "type")]
    pub artifact: ArtifactType,
    pub project_id: String,
    pub directory: PathBuf,
    pub java_package: Option<String>,
    #[serde(default)]
    pub source_directories: Vec<PathBuf>,
}

impl ProjectFile {
    /// Parse JSON, or JSON5 when the file name ends in `.json5`.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let is_json5 = path.extension().is_some_and(|ext| ext == "json5");
        let parsed = if is_json5 {
            json5::from_str(content).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(content).map_err(|e| e.to_string())
        };
        parsed.map_err(|e| {
            Error::Configuration(format!("failed to parse {}: {e}", path.display()))
        })
    }

    pub fn into_project(self, base_dir: &Path) -> Result<Project> {
        let mut project = Project::new(base_dir);

        for (ext, patterns) in &self.patterns {
            project.patterns_mut().add_patterns([ext], patterns);
        }

        for entry in self.configs {
            project.add_config(entry.into_config(base_dir)?);
        }

        for entry in self.outputs {
            let mut target =
                OutputTarget::new(entry.names, entry.artifact, entry.project_id, entry.directory);
            if let Some(package) = entry.java_package {
                target = target.with_namespace(package);
            }
            for dir in entry.source_directories {
                target.add_source_directory(project.resolve(&dir));
            }
            project.add_output(target)?;
        }

        Ok(project)
    }
}

impl ConfigEntry {
    fn into_config(self, base_dir: &Path) -> Result<ExtractionConfig> {
        let mut builder = ExtractionConfig::builder(self.name)
            .branches(self.branches)
            .with_reverse(self.with_reverse);

        if let Some(dir) = self.project_directory {
            builder = builder.project_directory(dir);
        }
        for pattern in self.include {
            builder = builder.include(pattern);
        }
        for pattern in self.exclude {
            builder = builder.exclude(pattern);
        }
        for list in self.lists {
            builder = builder.list(list);
        }
        for pot in self.pots {
            builder = builder.pot(pot);
        }
        if let Some(patterns) = self.patterns {
            let mut registry = PatternRegistry::new();
            for (ext, list) in &patterns {
                registry.add_patterns([ext], list);
            }
            builder = builder.patterns(registry);
        }
        for (phase, commands) in self.hooks {
            for argv in commands {
                builder = builder.hook(phase, command_hook(argv, base_dir.to_path_buf())?);
            }
        }

        builder.build()
    }
}

/// A hook that runs `argv` in `cwd`, passing its context through the environment.
pub fn command_hook(
    argv: Vec<String>,
    cwd: PathBuf,
) -> Result<impl Fn(&HookContext<'_>) -> Result<()>> {
    if argv.first().map_or(true, |program| program.is_empty()) {
        return Err(Error::Configuration("hook command is empty".to_string()));
    }

    Ok(move |context: &HookContext<'_>| {
        let env = [
            ("GETTEXT_TURBO_DOMAIN", context.domain.to_string()),
            ("GETTEXT_TURBO_PHASE", context.phase.to_string()),
            (
                "GETTEXT_TURBO_PROJECT_DIR",
                context
                    .project_dir
                    .map(|dir| dir.display().to_string())
                    .unwrap_or_default(),
            ),
            ("GETTEXT_TURBO_BRANCHES", context.branches.join("\n")),
        ];

        let output = process::run(&argv[0], &argv[1..], &cwd, &env).map_err(|e| Error::Hook {
            phase: context.phase.to_string(),
            message: e.to_string(),
        })?;
        if !output.trim().is_empty() {
            debug!("{} hook output: {}", context.phase, output.trim_end());
        }
        Ok(())
    })
}
