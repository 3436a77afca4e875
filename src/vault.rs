//! Document scanner and collection API.
//!
//! A vault is a directory tree of Markdown documents. Scanning walks the
//! tree, extracts every checkbox line into a [`Task`], and exposes the
//! query functions the presentation layer consumes. [`rewrite_line`] is the
//! single-line persistence primitive behind [`Task::commit`]: a whole-file
//! read-modify-write with no locking — a concurrent external writer between
//! read and write loses (last-writer-wins at line granularity).

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::warn;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::line;
use crate::task::{Task, TaskId};

/// Recognized document extension.
pub const DOCUMENT_EXTENSION: &str = "md";

/// Which tasks a query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskFilter {
    #[default]
    All,
    Unchecked,
    Completed,
}

impl TaskFilter {
    fn keeps(self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Unchecked => !task.is_completed(),
            TaskFilter::Completed => task.is_completed(),
        }
    }
}

/// Handle on a vault directory.
#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
    ignore: Vec<glob::Pattern>,
}

impl Vault {
    /// Open a vault at `root`. The directory must exist.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::VaultNotFound(root));
        }
        Ok(Self {
            root,
            ignore: Vec::new(),
        })
    }

    /// Add ignore globs, matched against paths relative to the vault root.
    pub fn with_ignore(mut self, patterns: &[String]) -> Result<Self> {
        for pattern in patterns {
            let compiled = glob::Pattern::new(pattern).map_err(|err| {
                Error::InvalidConfig(format!("invalid ignore pattern '{pattern}': {err}"))
            })?;
            self.ignore.push(compiled);
        }
        Ok(self)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Recursively enumerate the vault's Markdown documents, depth-first in
    /// sorted order. Symlinks are not followed.
    pub fn documents(&self) -> Result<Vec<PathBuf>> {
        let mut documents = Vec::new();
        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                // The root itself may be hidden; only prune hidden subdirs.
                if entry.depth() == 0 {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                if entry.file_type().is_dir() {
                    return !name.starts_with('.');
                }
                true
            });

        for entry in walker.filter_map(|entry| entry.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let is_markdown = path
                .extension()
                .map(|ext| ext == DOCUMENT_EXTENSION)
                .unwrap_or(false);
            if !is_markdown || self.is_ignored(path) {
                continue;
            }
            documents.push(path.to_path_buf());
        }

        Ok(documents)
    }

    /// Extract every task line of one document, in file order, with
    /// 1-based line numbers and the document's mtime attached.
    pub fn extract_tasks(&self, path: &Path) -> Result<Vec<Task>> {
        let contents = fs::read_to_string(path)?;
        let modified = document_mtime(path);

        let mut tasks = Vec::new();
        for (index, raw) in contents.split('\n').enumerate() {
            if line::is_task_line(raw) {
                tasks.push(Task::from_line(path, index + 1, raw, modified));
            }
        }

        Ok(tasks)
    }

    /// Discovery composed with extraction across every document, with an
    /// optional completion filter. Order is per-document line order; no
    /// ordering is guaranteed across documents beyond the sorted walk.
    pub fn query_tasks(&self, filter: TaskFilter) -> Result<Vec<Task>> {
        let mut all = Vec::new();
        for document in self.documents()? {
            let tasks = self.extract_tasks(&document)?;
            all.extend(tasks.into_iter().filter(|task| filter.keeps(task)));
        }
        Ok(all)
    }

    /// Look a task up by id, re-reading its document. Missing documents or
    /// a line that no longer holds a task report [`Error::TaskNotFound`].
    pub fn find_task(&self, id: &TaskId) -> Result<Task> {
        let tasks = self
            .extract_tasks(&id.path)
            .map_err(|_| Error::TaskNotFound(id.to_string()))?;
        tasks
            .into_iter()
            .find(|task| task.line() == id.line)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))
    }

    fn is_ignored(&self, path: &Path) -> bool {
        if self.ignore.is_empty() {
            return false;
        }
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let text = relative.to_string_lossy();
        self.ignore.iter().any(|pattern| pattern.matches(&text))
    }
}

/// Replace exactly one line (1-based) of `path`, rewriting the whole file.
///
/// Splits on `\n` so a trailing newline survives unchanged. An out-of-range
/// line number performs no write and returns a typed error.
pub fn rewrite_line(path: &Path, line_number: usize, new_text: &str) -> Result<()> {
    let contents = fs::read_to_string(path)?;
    let mut lines: Vec<&str> = contents.split('\n').collect();

    if line_number < 1 || line_number > lines.len() {
        warn!(
            path = %path.display(),
            line = line_number,
            line_count = lines.len(),
            "line rewrite out of bounds"
        );
        return Err(Error::LineOutOfBounds {
            path: path.to_path_buf(),
            line: line_number,
            line_count: lines.len(),
        });
    }

    lines[line_number - 1] = new_text;
    fs::write(path, lines.join("\n"))?;
    Ok(())
}

fn document_mtime(path: &Path) -> Option<DateTime<Utc>> {
    let modified = fs::metadata(path).and_then(|meta| meta.modified()).ok()?;
    Some(DateTime::<Utc>::from(modified))
}
