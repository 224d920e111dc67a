use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use engine_logging::engine_debug;

use crate::persist::{ensure_output_dir, replace_file_atomically, PersistError};

/// Line separating consecutive documents in the output file.
pub const DOCUMENT_SEPARATOR: &str = "---";

/// Appends rendered documents to the output file, each followed by a separator
/// line. Every document is flushed as soon as it is written, so an aborted run
/// leaves the documents written so far on disk.
pub struct DocumentWriter {
    path: PathBuf,
    out: BufWriter<File>,
    documents: usize,
}

impl DocumentWriter {
    /// Create (or truncate) the file at `path`, creating its directory if needed.
    pub fn create(path: &Path) -> Result<Self, PersistError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_output_dir(parent)?;
        }
        let file = File::create(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
            documents: 0,
        })
    }

    pub fn documents(&self) -> usize {
        self.documents
    }

    pub fn append_document(&mut self, document: &str) -> Result<(), PersistError> {
        self.out.write_all(document.as_bytes())?;
        if !document.ends_with('\n') {
            self.out.write_all(b"\n")?;
        }
        self.out.write_all(DOCUMENT_SEPARATOR.as_bytes())?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        self.documents += 1;
        Ok(())
    }

    /// Close the file and trim the trailing separator.
    pub fn finish(mut self) -> Result<PathBuf, PersistError> {
        self.out.flush()?;
        drop(self.out);
        trim_output_file(&self.path)?;
        Ok(self.path)
    }
}

/// Strip trailing separator lines and the blank lines that follow them.
///
/// Only whole separator lines are removed; content that merely ends in `-`
/// is left alone, and so is the newline ending the last document. Blank lines
/// before a separator belong to the document above it. Applying this to its
/// own output changes nothing.
pub fn trim_document_tail(content: &str) -> &str {
    let mut rest = content;
    loop {
        let before_blanks = strip_blank_lines(rest);
        let (head, last) = split_last_line(before_blanks);
        if !is_separator(last) {
            return rest;
        }
        rest = head;
    }
}

fn is_separator(line: &str) -> bool {
    line.trim_end() == DOCUMENT_SEPARATOR
}

fn strip_blank_lines(mut text: &str) -> &str {
    while !text.is_empty() {
        let (head, last) = split_last_line(text);
        if !last.trim().is_empty() {
            break;
        }
        text = head;
    }
    text
}

/// Split off the final line. The head keeps its newline; the line does not.
fn split_last_line(text: &str) -> (&str, &str) {
    let body = text.strip_suffix('\n').unwrap_or(text);
    match body.rfind('\n') {
        Some(at) => (&text[..=at], &body[at + 1..]),
        None => ("", body),
    }
}

/// Rewrite `path` with its tail trimmed. Leaves the file untouched when there
/// is nothing to trim.
pub fn trim_output_file(path: &Path) -> Result<(), PersistError> {
    let content = fs::read_to_string(path)?;
    let trimmed = trim_document_tail(&content);
    if trimmed.len() == content.len() {
        return Ok(());
    }
    engine_debug!(
        "Trimming {} trailing bytes from {:?}",
        content.len() - trimmed.len(),
        path
    );
    replace_file_atomically(path, trimmed)
}
