//! Request path → file on disk.
//!
//! # Responsibilities
//! - Map `/` to the default document
//! - Normalise `.` / `..` segments so nothing resolves above the root
//! - Read the file and classify I/O failures
//! - Render the not-found page

use std::io;
use std::path::{Path, PathBuf};

use crate::config::EntryPoint;

/// A request path resolved against the content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Normalised path relative to the root, `/`-separated.
    pub relative: String,
    /// `root` joined with `relative`.
    pub full: PathBuf,
}

impl ResolvedPath {
    pub fn file_name(&self) -> Option<&str> {
        self.relative.rsplit('/').next().filter(|name| !name.is_empty())
    }
}

/// Normalise a request path into root-relative segments.
///
/// `..` pops the previous segment and is ignored at the top, so the
/// result can only name something inside the root.
pub fn normalize(request_path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in request_path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

pub fn resolve(root: &Path, request_path: &str, default_document: &str) -> ResolvedPath {
    let target = if request_path == "/" {
        default_document
    } else {
        request_path
    };
    let relative = normalize(target);
    let full = relative
        .split('/')
        .filter(|s| !s.is_empty())
        .fold(root.to_path_buf(), |path, segment| path.join(segment));
    ResolvedPath { relative, full }
}

/// Outcome of reading a resolved file.
#[derive(Debug)]
pub enum FileError {
    NotFound,
    Other(io::Error),
}

impl From<io::Error> for FileError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => FileError::NotFound,
            _ => FileError::Other(e),
        }
    }
}

pub async fn read(path: &Path) -> Result<Vec<u8>, FileError> {
    Ok(tokio::fs::read(path).await?)
}

/// Short code for an I/O error, as shown on the 500 page.
pub fn error_code(e: &io::Error) -> String {
    format!("{:?}", e.kind())
}

pub fn not_found_page(relative: &str, entry_points: &[EntryPoint]) -> String {
    let items: String = entry_points
        .iter()
        .map(|entry| {
            format!(
                "        <li><a href=\"/{path}\">{path}</a> - {description}</li>\n",
                path = escape(&entry.path),
                description = escape(&entry.description),
            )
        })
        .collect();

    format!(
        "<h1>404 - File Not Found</h1>\n\
         <p>Could not find: /{}</p>\n\
         <p>Available files:</p>\n\
         <ul>\n{}</ul>\n",
        escape(relative),
        items
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
