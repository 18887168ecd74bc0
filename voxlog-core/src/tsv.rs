//! Tab-separated tabular backends for the journal log.
//!
//! The journal treats its storage as an ordered table of string cells. Two
//! implementations are provided: a purely in-memory one (also the test double)
//! and one backed by a TSV file on disk. Remote spreadsheet backends plug in
//! through the same trait.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// An ordered table of string rows. Row order is append order; `delete_row`
/// addresses the index as returned by `rows`.
pub trait TabularData {
    fn rows(&self) -> Result<Vec<Vec<String>>>;
    fn append_row(&mut self, cells: Vec<String>) -> Result<()>;
    fn is_empty(&self) -> Result<bool>;
    fn delete_row(&mut self, index: usize) -> Result<()>;
}

/// In-memory TSV content.
#[derive(Debug, Default)]
pub struct StringTabularData {
    content: String,
}

impl StringTabularData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl TabularData for StringTabularData {
    fn rows(&self) -> Result<Vec<Vec<String>>> {
        Ok(self
            .content
            .lines()
            .map(|line| line.split('\t').map(str::to_string).collect())
            .collect())
    }

    fn append_row(&mut self, cells: Vec<String>) -> Result<()> {
        self.content.push_str(&cells.join("\t"));
        self.content.push('\n');
        Ok(())
    }

    fn is_empty(&self) -> Result<bool> {
        Ok(self.content.is_empty())
    }

    fn delete_row(&mut self, index: usize) -> Result<()> {
        let mut lines: Vec<&str> = self.content.lines().collect();
        anyhow::ensure!(index < lines.len(), "row index {index} out of bounds");
        lines.remove(index);
        self.content = lines.join("\n");
        if !self.content.is_empty() {
            self.content.push('\n');
        }
        Ok(())
    }
}

/// TSV file on disk. Content is loaded once on open and written back after
/// every mutation.
#[derive(Debug)]
pub struct FileTabularData {
    path: PathBuf,
    inner: StringTabularData,
}

impl FileTabularData {
    /// Opens `path`, treating a missing file as an empty journal.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = if path.exists() {
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?
        } else {
            String::new()
        };
        Ok(Self {
            path,
            inner: StringTabularData::from_content(content),
        })
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(&self.path, self.inner.content())
            .with_context(|| format!("writing {}", self.path.display()))
    }
}

impl TabularData for FileTabularData {
    fn rows(&self) -> Result<Vec<Vec<String>>> {
        self.inner.rows()
    }

    fn append_row(&mut self, cells: Vec<String>) -> Result<()> {
        self.inner.append_row(cells)?;
        self.persist()
    }

    fn is_empty(&self) -> Result<bool> {
        self.inner.is_empty()
    }

    fn delete_row(&mut self, index: usize) -> Result<()> {
        self.inner.delete_row(index)?;
        self.persist()
    }
}
