//! The upload collaborator: turns files on disk into a document context.
//!
//! Each file must be UTF-8 text. Files are concatenated in the given order,
//! each under a header naming it; the names become the context's labels.

use std::path::{Path, PathBuf};

/// Content and names ready for `ChatEngine::apply_context`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub content: String,
    pub names: Vec<String>,
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read and concatenate `paths`.
///
/// Empty files are skipped; it is an error if nothing readable remains.
pub fn read_documents(paths: &[PathBuf]) -> Result<Upload, String> {
    if paths.is_empty() {
        return Err("no files given".into());
    }

    let mut sections = Vec::with_capacity(paths.len());
    let mut names = Vec::with_capacity(paths.len());

    for path in paths {
        let bytes =
            std::fs::read(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        let text = String::from_utf8(bytes)
            .map_err(|_| format!("{} is not a UTF-8 text file", path.display()))?;

        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        let name = display_name(path);
        sections.push(format!("=== {name} ===\n{text}"));
        names.push(name);
    }

    if names.is_empty() {
        return Err("the given files contain no text".into());
    }

    Ok(Upload {
        content: sections.join("\n\n"),
        names,
    })
}
