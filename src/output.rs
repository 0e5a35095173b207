use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::catalog::{Catalog, MessageEntry};
use crate::config::{ArtifactType, Project};
use crate::error::{Error, Result};
use crate::fs::FileSystem;
use crate::locale;
use crate::merger::{MergeOptions, MergedCatalog, TranslationMerger};
use crate::process;
use crate::validator::Validator;

/// Writes merged catalogs in the artifact format of their target.
pub struct OutputDispatcher<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> OutputDispatcher<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    /// Write one merged catalog under `output_base`; returns the files produced.
    pub fn write(&self, output_base: &Path, merged: &MergedCatalog<'_>) -> Result<Vec<PathBuf>> {
        info!("Writing {} / {}", merged.locale, merged.domain);

        let out_dir = output_base.join(merged.target.directory());
        let locale = locale::to_underscore(&merged.locale);

        match merged.target.artifact() {
            ArtifactType::Mo => {
                let path = out_dir
                    .join(&locale)
                    .join("LC_MESSAGES")
                    .join(format!("{}.mo", merged.domain));
                debug!("Writing to {}", path.display());
                merged
                    .catalog
                    .filtered(MessageEntry::is_translated)
                    .write_mo(&path)?;
                Ok(vec![path])
            }
            ArtifactType::Js => {
                let path = out_dir.join(format!("{}_{}.js", merged.domain, locale));
                debug!("Writing to {}", path.display());
                self.fs.create_dir_all(&out_dir)?;
                self.fs
                    .atomic_write(&path, js_module(&merged.catalog)?.as_bytes())?;
                Ok(vec![path])
            }
            ArtifactType::Java => {
                let namespace = merged.target.namespace().ok_or_else(|| {
                    Error::Configuration(format!("java output for {} has no package", merged.domain))
                })?;
                debug!("Writing to {}", out_dir.display());
                self.fs.create_dir_all(&out_dir)?;
                compile_java(&merged.catalog, namespace, &merged.domain, &locale, &out_dir)
            }
        }
    }
}

/// `export default {..}` with every translated pair, in catalog order.
pub fn js_module(catalog: &Catalog) -> Result<String> {
    let mut map = serde_json::Map::new();
    for entry in catalog.entries() {
        if entry.original.is_empty() {
            continue;
        }
        if let Some(translation) = entry.primary_translation() {
            map.insert(
                entry.original.clone(),
                serde_json::Value::String(translation.to_string()),
            );
        }
    }

    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    map.serialize(&mut serializer)
        .map_err(|e| Error::Io(e.into()))?;
    let json = String::from_utf8_lossy(&buf).replace("\\\\n", "\\n");

    Ok(format!("export default {json}"))
}

/// Build Java resource classes with `msgfmt --java2` in a scratch directory,
/// then copy every produced `.class` file into `out_dir`.
fn compile_java(
    catalog: &Catalog,
    namespace: &str,
    domain: &str,
    locale: &str,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let scratch = tempfile::tempdir()?;
    let po_path = scratch.path().join("tmp.po");
    catalog.write_po(&po_path)?;

    let resource = format!("{namespace}.{domain}");
    let args: [&OsStr; 7] = [
        OsStr::new("--java2"),
        OsStr::new("-d"),
        scratch.path().as_os_str(),
        OsStr::new("-r"),
        OsStr::new(&resource),
        OsStr::new("-l"),
        OsStr::new(locale),
    ];
    process::run(
        "msgfmt",
        args.into_iter().chain([po_path.as_os_str()]),
        scratch.path(),
        &[],
    )?;

    let mut copied = Vec::new();
    for entry in WalkDir::new(scratch.path()) {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension() != Some(OsStr::new("class")) {
            continue;
        }
        let target = out_dir.join(entry.file_name());
        std::fs::copy(path, &target)?;
        copied.push(target);
    }

    Ok(copied)
}

/// Merge, filter and write every target of `project_id`.
///
/// Returns the number of (target, domain, locale) catalogs written. Writing
/// nothing at all is an error.
pub fn write_translations(
    project: &Project,
    project_id: &str,
    output_base: &Path,
    options: MergeOptions,
    fs: &dyn FileSystem,
) -> Result<usize> {
    let validator = Validator::default();
    let merged = TranslationMerger::new(fs, &validator, options).merge(project, project_id)?;

    if merged.is_empty() {
        return Err(Error::ProducedNothing {
            project: project_id.to_string(),
        });
    }

    let dispatcher = OutputDispatcher::new(fs);
    for item in &merged {
        dispatcher.write(output_base, item)?;
    }

    Ok(merged.len())
}
