//! Shared utility functions

use std::path::{Path, PathBuf};

/// Safely truncate a string at a UTF-8 boundary
pub fn safe_truncate(s: &str, max_bytes: usize) -> &str {
    if max_bytes >= s.len() { return s; }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Short single-line preview of a prompt or response for debug logs
pub fn preview(s: &str, max_bytes: usize) -> String {
    let flat = s.replace('\n', " ");
    let cut = safe_truncate(&flat, max_bytes);
    if cut.len() < flat.len() {
        format!("{}... ({} bytes)", cut, s.len())
    } else {
        cut.to_string()
    }
}

/// Output path for a converted document: `<output_dir>/<stem>_converted.docx`,
/// where the stem is the file name up to its first dot.
pub fn converted_output_path(output_dir: &Path, pdf_file_name: &str) -> PathBuf {
    let base = Path::new(pdf_file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(pdf_file_name);
    let stem = base.split('.').next().unwrap_or(base);
    output_dir.join(format!("{}_converted.docx", stem))
}

/// Mask a secret for display (shows first 8 / last 4 chars)
pub fn mask_secret(key: &str) -> String {
    if key.len() > 12 && key.is_char_boundary(8) && key.is_char_boundary(key.len() - 4) {
        format!("{}...{}", &key[..8], &key[key.len() - 4..])
    } else {
        "*".repeat(key.chars().count())
    }
}
