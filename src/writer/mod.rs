use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const WRITER_BUFFER_SIZE: usize = 64 * 1024;

/// Buffered markdown file, created (or truncated) on open.
///
/// Documents are separated by exactly one blank line; the separator is
/// written before every document except the first, so nothing trails the
/// last one.
pub struct DocWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    documents: usize,
}

impl DocWriter {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("creating file {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::with_capacity(WRITER_BUFFER_SIZE, file),
            documents: 0,
        })
    }

    pub fn write_document(&mut self, markdown: &str) -> Result<()> {
        if self.documents > 0 {
            self.writer
                .write_all(b"\n")
                .with_context(|| format!("writing file {}", self.path.display()))?;
        }
        self.writer
            .write_all(markdown.as_bytes())
            .with_context(|| format!("writing file {}", self.path.display()))?;
        self.documents += 1;
        Ok(())
    }

    /// Flush and close the file
    pub fn finish(mut self) -> Result<PathBuf> {
        self.writer
            .flush()
            .with_context(|| format!("flushing file {}", self.path.display()))?;
        Ok(self.path)
    }
}

/// Create the output directory and any missing parents
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))
}
