//! Folder packaging.
//!
//! `collect_leaves` turns a folder subtree into `(path, bytes)` entries and
//! `build_zip` writes those entries into a zip archive. The two halves are
//! separate so the tree walk can be tested without reading zip files.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::node::OwnerId;
use super::store::NodeStore;
use super::MAX_TREE_DEPTH;
use crate::{Result, VaultError};

/// One file inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Slash-separated path relative to the archived folder.
    pub path: String,
    /// File content.
    pub content: Vec<u8>,
}

/// Make a node name safe to use as one zip path segment.
///
/// Separators and control characters become `_`, as do names that would be
/// read as `.` or `..`.
pub fn sanitize_segment(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    match cleaned.trim() {
        "" | "." | ".." => "_".repeat(cleaned.len().max(1)),
        _ => cleaned,
    }
}

/// Collect every file below `folder_id` with its path under `base_path`.
///
/// Entries come out depth-first in the store's child order. Empty folders
/// produce no entries.
pub async fn collect_leaves<S>(
    store: &S,
    folder_id: &str,
    owner: OwnerId,
    base_path: &str,
) -> Result<Vec<ArchiveEntry>>
where
    S: NodeStore + ?Sized,
{
    let mut entries = Vec::new();
    let mut stack = vec![(folder_id.to_string(), base_path.to_string(), 0usize, None)];

    while let Some((id, path, depth, data)) = stack.pop() {
        if let Some(content) = data {
            entries.push(ArchiveEntry { path, content });
            continue;
        }
        if depth >= MAX_TREE_DEPTH {
            return Err(VaultError::Validation(format!(
                "folder nesting exceeds {MAX_TREE_DEPTH} levels"
            )));
        }

        let children = store.find_children(Some(&id), owner).await?;
        for child in children.into_iter().rev() {
            let child_path = format!("{path}{}", sanitize_segment(&child.name));
            if child.is_folder() {
                stack.push((child.id, format!("{child_path}/"), depth + 1, None));
            } else {
                let content = child.data.unwrap_or_default();
                stack.push((child.id, child_path, depth, Some(content)));
            }
        }
    }

    Ok(entries)
}

/// Append ` (n)` before the extension until `path` is not in `seen`.
fn disambiguate(path: &str, seen: &HashSet<String>) -> String {
    if !seen.contains(path) {
        return path.to_string();
    }

    let (dir, file) = match path.rfind('/') {
        Some(i) => path.split_at(i + 1),
        None => ("", path),
    };
    let (stem, ext) = match file.rfind('.') {
        Some(i) if i > 0 => file.split_at(i),
        _ => (file, ""),
    };

    (1..)
        .map(|n| format!("{dir}{stem} ({n}){ext}"))
        .find(|candidate| !seen.contains(candidate))
        .unwrap_or_else(|| path.to_string())
}

/// Write `entries` into an in-memory zip archive (deflate).
///
/// Sibling files may share a name; later duplicates get a ` (n)` suffix.
pub fn build_zip(entries: &[ArchiveEntry]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    let mut seen = HashSet::new();
    for entry in entries {
        let path = disambiguate(&entry.path, &seen);
        writer.start_file(path.as_str(), options)?;
        writer.write_all(&entry.content)?;
        seen.insert(path);
    }

    Ok(writer.finish()?.into_inner())
}
