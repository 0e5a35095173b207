use std::path::Path;
use tracing::{debug, info};

use crate::catalog::MessageEntry;
use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::patterns::CompiledPatterns;
use crate::vcs::Vcs;

/// Branches to scan: the configured list, else remote branches, else local ones.
pub fn resolve_branches(
    vcs: &dyn Vcs,
    config: &ExtractionConfig,
    project_dir: &Path,
) -> Result<Vec<String>> {
    if !config.branches().is_empty() {
        return Ok(config.branches().to_vec());
    }

    let remote = vcs.remote_branches(project_dir)?;
    if !remote.is_empty() {
        return Ok(remote);
    }

    debug!(
        "No remote branches in {}, using local branches",
        project_dir.display()
    );
    vcs.local_branches(project_dir)
}

/// Scan every branch of `config`'s project and append what the patterns find.
///
/// Returns the branches that were scanned.
pub fn scan_branches(
    vcs: &dyn Vcs,
    config: &mut ExtractionConfig,
    project_dir: &Path,
    patterns: &CompiledPatterns,
) -> Result<Vec<String>> {
    let branches = resolve_branches(vcs, config, project_dir)?;

    for branch in &branches {
        let files = vcs.list_files(project_dir, branch)?;
        let mut scanned = 0usize;

        let accepted: Vec<&String> = files.iter().filter(|f| config.accepts_path(f)).collect();

        for file in accepted {
            let ext = extension(file);
            if patterns.for_extension(ext).is_empty() {
                continue;
            }

            let content = vcs.show(project_dir, branch, file)?;
            extract_file(config, patterns, branch, file, &content);
            scanned += 1;
        }

        info!("{}: scanned {} file(s) on {}", config.name(), scanned, branch);
    }

    Ok(branches)
}

/// Append one entry per message found in `content`, referenced as `branch file`.
pub fn extract_file(
    config: &mut ExtractionConfig,
    patterns: &CompiledPatterns,
    branch: &str,
    file: &str,
    content: &str,
) {
    let reference = format!("{branch} {file}");
    for message in patterns.find_messages(extension(file), content) {
        config.add_entry(MessageEntry::new(message).with_reference(reference.clone()));
    }
}

fn extension(file: &str) -> &str {
    Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternRegistry;
    use crate::vcs::mock::InMemoryVcs;
    use pretty_assertions::assert_eq;

    fn references(config: &ExtractionConfig) -> Vec<(String, String)> {
        config
            .entries()
            .iter()
            .map(|e| (e.original.clone(), e.references.join("|")))
            .collect()
    }

    #[test]
    fn test_explicit_branches_win() {
        let mut vcs = InMemoryVcs::new();
        vcs.remote = vec!["origin/main".to_string()];
        let config = ExtractionConfig::builder("messages")
            .branch("release")
            .build()
            .unwrap();

        let branches = resolve_branches(&vcs, &config, Path::new("/repo")).unwrap();
        assert_eq!(branches, vec!["release"]);
    }

    #[test]
    fn test_falls_back_to_local_branches() {
        let mut vcs = InMemoryVcs::new();
        vcs.local = vec!["main".to_string(), "dev".to_string()];
        let config = ExtractionConfig::builder("messages").build().unwrap();

        let branches = resolve_branches(&vcs, &config, Path::new("/repo")).unwrap();
        assert_eq!(branches, vec!["main", "dev"]);

        vcs.remote = vec!["origin/main".to_string()];
        let branches = resolve_branches(&vcs, &config, Path::new("/repo")).unwrap();
        assert_eq!(branches, vec!["origin/main"]);
    }

    #[test]
    fn test_scan_filters_and_references() {
        let mut vcs = InMemoryVcs::new();
        vcs.remote = vec!["origin/main".to_string(), "origin/dev".to_string()];
        vcs.add_file("origin/main", "src/app.js", "x = tr('Save');");
        vcs.add_file("origin/main", "src/app.min.js", "x = tr('Minified');");
        vcs.add_file("origin/main", "docs/readme.js", "x = tr('Docs');");
        vcs.add_file("origin/dev", "src/app.js", "x = tr('Save'); y = tr(\"Load\");");

        let mut config = ExtractionConfig::builder("messages")
            .include("^src/")
            .exclude(r"\.min\.js$")
            .build()
            .unwrap();
        let patterns = PatternRegistry::defaults().compile().unwrap();

        let branches = scan_branches(&vcs, &mut config, Path::new("/repo"), &patterns).unwrap();

        assert_eq!(branches, vec!["origin/main", "origin/dev"]);
        assert_eq!(
            references(&config),
            vec![
                ("Save".to_string(), "origin/main src/app.js".to_string()),
                ("Save".to_string(), "origin/dev src/app.js".to_string()),
                ("Load".to_string(), "origin/dev src/app.js".to_string()),
            ]
        );
        assert_eq!(
            *vcs.fetched.borrow(),
            vec!["origin/main:src/app.js", "origin/dev:src/app.js"]
        );
    }

    #[test]
    fn test_files_without_patterns_are_not_fetched() {
        let mut vcs = InMemoryVcs::new();
        vcs.local = vec!["main".to_string()];
        vcs.add_file("main", "README.md", "tr('nope')");
        vcs.add_file("main", "Makefile", "tr('nope')");

        let mut config = ExtractionConfig::builder("messages").build().unwrap();
        let patterns = PatternRegistry::defaults().compile().unwrap();
        scan_branches(&vcs, &mut config, Path::new("/repo"), &patterns).unwrap();

        assert!(config.entries().is_empty());
        assert!(vcs.fetched.borrow().is_empty());
    }

    #[test]
    fn test_extract_file_skips_empty_messages() {
        let mut config = ExtractionConfig::builder("messages").build().unwrap();
        let patterns = PatternRegistry::defaults().compile().unwrap();

        extract_file(
            &mut config,
            &patterns,
            "main",
            "index.php",
            "<?= tr('') ?> <?= tr('Welcome') ?>",
        );

        assert_eq!(config.entries().len(), 1);
        assert_eq!(config.entries()[0].original, "Welcome");
        assert_eq!(config.entries()[0].references, vec!["main index.php"]);
    }
}
