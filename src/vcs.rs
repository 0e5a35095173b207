use std::path::Path;

use crate::error::Result;
use crate::process;

/// Read-only access to a version-controlled project tree.
pub trait Vcs {
    /// Remote-tracking branches, without head pointers.
    fn remote_branches(&self, project_dir: &Path) -> Result<Vec<String>>;

    /// All branches known locally, without head pointers or current-branch markers.
    fn local_branches(&self, project_dir: &Path) -> Result<Vec<String>>;

    /// Every file path in `branch`'s tree, repository-relative.
    fn list_files(&self, project_dir: &Path, branch: &str) -> Result<Vec<String>>;

    /// Content of `path` as of `branch`.
    fn show(&self, project_dir: &Path, branch: &str, path: &str) -> Result<String>;
}

/// `git` invoked as a subprocess.
#[derive(Debug, Default, Clone)]
pub struct GitCli;

impl Vcs for GitCli {
    fn remote_branches(&self, project_dir: &Path) -> Result<Vec<String>> {
        let out = process::run("git", ["branch", "--all", "--remote"], project_dir, &[])?;
        Ok(parse_branch_list(&out))
    }

    fn local_branches(&self, project_dir: &Path) -> Result<Vec<String>> {
        let out = process::run("git", ["branch", "--all"], project_dir, &[])?;
        Ok(parse_branch_list(&out))
    }

    fn list_files(&self, project_dir: &Path, branch: &str) -> Result<Vec<String>> {
        let out = process::run(
            "git",
            ["ls-tree", "-z", branch, "-r", "--name-only"],
            project_dir,
            &[],
        )?;
        Ok(parse_tree_listing(&out))
    }

    fn show(&self, project_dir: &Path, branch: &str, path: &str) -> Result<String> {
        let object = format!("{branch}:./{path}");
        process::run("git", ["show", object.as_str()], project_dir, &[])
    }
}

/// Branch names from `git branch` output, one per line.
///
/// Current-branch markers (`*`, `+`) are stripped. Head pointers
/// (`origin/HEAD -> origin/main`, a bare `HEAD`, `(HEAD detached at ..)`) are dropped.
pub fn parse_branch_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| line.trim().trim_start_matches(['*', '+']).trim())
        .filter(|name| !name.is_empty() && !is_head_pointer(name))
        .map(str::to_string)
        .collect()
}

/// Paths from NUL-separated `git ls-tree -z` output, unquoted as stored.
pub fn parse_tree_listing(output: &str) -> Vec<String> {
    output
        .split('\0')
        .filter(|path| !path.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_head_pointer(name: &str) -> bool {
    name.contains("->")
        || name.starts_with("(HEAD")
        || name.rsplit('/').next() == Some("HEAD")
}

/// In-memory repository for tests
#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::error::Error;
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    #[derive(Debug, Default)]
    pub struct InMemoryVcs {
        pub remote: Vec<String>,
        pub local: Vec<String>,
        /// branch -> (path -> content), in insertion order of paths
        pub trees: BTreeMap<String, Vec<(String, String)>>,
        /// Every `show` call as `branch:path`
        pub fetched: RefCell<Vec<String>>,
    }

    impl InMemoryVcs {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_file(&mut self, branch: &str, path: &str, content: &str) {
            self.trees
                .entry(branch.to_string())
                .or_default()
                .push((path.to_string(), content.to_string()));
        }
    }

    impl Vcs for InMemoryVcs {
        fn remote_branches(&self, _project_dir: &Path) -> Result<Vec<String>> {
            Ok(self.remote.clone())
        }

        fn local_branches(&self, _project_dir: &Path) -> Result<Vec<String>> {
            Ok(self.local.clone())
        }

        fn list_files(&self, _project_dir: &Path, branch: &str) -> Result<Vec<String>> {
            Ok(self
                .trees
                .get(branch)
                .map(|files| files.iter().map(|(path, _)| path.clone()).collect())
                .unwrap_or_default())
        }

        fn show(&self, project_dir: &Path, branch: &str, path: &str) -> Result<String> {
            self.fetched.borrow_mut().push(format!("{branch}:{path}"));
            self.trees
                .get(branch)
                .and_then(|files| files.iter().find(|(p, _)| p == path))
                .map(|(_, content)| content.clone())
                .ok_or_else(|| Error::ToolInvocation {
                    command: format!("show {branch}:{path}"),
                    cwd: project_dir.display().to_string(),
                    code: 128,
                    stderr: "path does not exist".to_string(),
                })
        }
    }
}
