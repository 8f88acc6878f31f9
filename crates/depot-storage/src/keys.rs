//! Filename sanitization and storage key generation.
//!
//! Key format: `YYYY/MM/DD/{uuid-simple}.{ext}` (UTC date). The random
//! component makes keys collision-free by construction; the sanitized
//! original filename is recorded in object metadata only.

use chrono::Utc;
use uuid::Uuid;

use depot_core::constants::FALLBACK_FILENAME;

const MAX_FILENAME_LENGTH: usize = 255;

/// Sanitize a caller-supplied filename.
///
/// Strips `..` sequences, replaces path separators with `-`, drops control
/// and filesystem-special characters, collapses whitespace, and truncates
/// to 255 characters while preserving the extension. An empty or dash-only
/// result falls back to `unnamed`.
pub fn sanitize_filename(filename: &str) -> String {
    let no_traversal = filename.replace("..", "");

    let mut out = String::with_capacity(no_traversal.len());
    let mut last_was_space = false;
    for c in no_traversal.chars() {
        if c == '/' || c == '\\' {
            out.push('-');
            last_was_space = false;
        } else if matches!(c, '<' | '>' | ':' | '"' | '|' | '?' | '*') || c.is_control() {
            // dropped
        } else if c.is_whitespace() {
            if !last_was_space && !out.is_empty() {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.push(c);
            last_was_space = false;
        }
    }

    let trimmed = out.trim();
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '-' || c == ' ') {
        return FALLBACK_FILENAME.to_string();
    }

    truncate_preserving_extension(trimmed, MAX_FILENAME_LENGTH)
}

/// Extract a lowercase extension from a sanitized filename, if any.
pub fn file_extension(filename: &str) -> Option<String> {
    let idx = filename.rfind('.')?;
    if idx == 0 || idx + 1 == filename.len() {
        return None;
    }
    let ext = &filename[idx + 1..];
    if ext.contains(' ') || ext.len() > 16 {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Build a fresh storage key for an upload with the given original filename.
pub fn generate_key(original_filename: &str) -> String {
    let sanitized = sanitize_filename(original_filename);
    let date = Utc::now().format("%Y/%m/%d");
    let id = Uuid::new_v4().simple();
    match file_extension(&sanitized) {
        Some(ext) => format!("{}/{}.{}", date, id, ext),
        None => format!("{}/{}", date, id),
    }
}

fn truncate_preserving_extension(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }
    match name.rfind('.') {
        Some(idx) if idx > 0 => {
            let ext = &name[idx..];
            let ext_len = ext.chars().count();
            if ext_len < max {
                let stem: String = name.chars().take(max - ext_len).collect();
                format!("{}{}", stem, ext)
            } else {
                name.chars().take(max).collect()
            }
        }
        _ => name.chars().take(max).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_traversal_and_separators() {
        let out = sanitize_filename("../../etc/passwd");
        assert!(!out.contains(".."));
        assert!(!out.contains('/'));

        let out = sanitize_filename("a\\b/c.txt");
        assert!(!out.contains('/'));
        assert!(!out.contains('\\'));
        assert!(out.ends_with(".txt"));
    }

    #[test]
    fn sanitize_strips_control_and_special_chars() {
        let out = sanitize_filename("lo\x00go<1>:\"|?*.png\x7f");
        for c in ['\x00', '<', '>', ':', '"', '|', '?', '*', '\x7f'] {
            assert!(!out.contains(c), "found {:?} in {:?}", c, out);
        }
        assert!(out.contains("logo"));
    }

    #[test]
    fn sanitize_collapses_whitespace() {
        assert_eq!(sanitize_filename("my   brand \t logo.png"), "my brand logo.png");
    }

    #[test]
    fn sanitize_empty_falls_back() {
        assert_eq!(sanitize_filename(""), "unnamed");
        assert_eq!(sanitize_filename("///"), "unnamed");
        assert_eq!(sanitize_filename("..\x01.."), "unnamed");
    }

    #[test]
    fn sanitize_truncates_preserving_extension() {
        let long = format!("{}.png", "a".repeat(300));
        let out = sanitize_filename(&long);
        assert_eq!(out.chars().count(), 255);
        assert!(out.ends_with(".png"));
    }

    #[test]
    fn generated_keys_have_date_prefix_and_extension() {
        let key = generate_key("logo.PNG");
        let parts: Vec<&str> = key.split('/').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0].len(), 4);
        assert_eq!(parts[1].len(), 2);
        assert_eq!(parts[2].len(), 2);
        assert!(parts[3].ends_with(".png"));
        assert!(!key.contains(".."));
        assert!(!key.starts_with('/'));
    }

    #[test]
    fn generated_keys_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(generate_key("logo.png")));
        }
    }

    #[test]
    fn extension_edge_cases() {
        assert_eq!(file_extension("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(file_extension(".bashrc"), None);
        assert_eq!(file_extension("noext"), None);
        assert_eq!(file_extension("trailing."), None);
    }
}
