use crate::domain::models::{DecodedContent, DumpConfig, EntryKind, HIDDEN_MARKER, WalkEntry};
use log::{debug, warn};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path};
use walkdir::DirEntry;

fn relative_components(path: &Path, root: &Path) -> Vec<String> {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .filter_map(|comp| match comp {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

fn is_hidden(name: &str) -> bool {
    name.starts_with(HIDDEN_MARKER)
}

/// True when any component of the relative path is an excluded or hidden
/// directory name, so a match at any depth prunes the whole subtree.
pub fn is_excluded_path<S: AsRef<str>>(components: &[S], exclude_dirs: &BTreeSet<String>) -> bool {
    components.iter().any(|comp| {
        let comp = comp.as_ref();
        exclude_dirs.contains(comp) || is_hidden(comp)
    })
}

pub fn is_listed_file(name: &str, extensions: &[String]) -> bool {
    !is_hidden(name) && extensions.iter().any(|ext| name.ends_with(ext.as_str()))
}

// Files before subdirectories, each group by name.
fn walk_order(a: &DirEntry, b: &DirEntry) -> Ordering {
    let a_dir = a.file_type().is_dir();
    let b_dir = b.file_type().is_dir();
    a_dir
        .cmp(&b_dir)
        .then_with(|| a.file_name().cmp(b.file_name()))
}

fn to_walk_entry(entry: DirEntry, config: &DumpConfig) -> Option<WalkEntry> {
    let file_type = entry.file_type();
    // Symlinks count as files unless they resolve to a directory, so a
    // dangling link is still listed and reported as unreadable.
    let kind = if file_type.is_dir() {
        EntryKind::Directory
    } else if file_type.is_file() || (file_type.is_symlink() && !entry.path().is_dir()) {
        EntryKind::File
    } else {
        debug!("Skipping non-regular entry: {}", entry.path().display());
        return None;
    };

    let relative = relative_components(entry.path(), &config.root).join("/");

    if kind == EntryKind::File {
        let name = entry.file_name().to_string_lossy();
        if !is_listed_file(&name, &config.extensions) {
            return None;
        }
    }

    Some(WalkEntry {
        kind,
        depth: entry.depth(),
        path: entry.into_path(),
        relative,
    })
}

/// Walks `config.root` top-down and yields every retained directory and file.
///
/// Excluded directories are pruned before they are read. The root comes first,
/// then for each directory its files in name order followed by its
/// subdirectories in name order. Unreadable entries are logged and skipped.
pub fn walk_filtered(config: &DumpConfig) -> impl Iterator<Item = WalkEntry> + '_ {
    walkdir::WalkDir::new(&config.root)
        .follow_links(false)
        .sort_by(walk_order)
        .into_iter()
        .filter_entry(move |e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let components = relative_components(e.path(), &config.root);
            let excluded = is_excluded_path(&components, &config.exclude_dirs);
            if excluded {
                debug!("Pruning directory: {}", e.path().display());
            }
            !excluded
        })
        .filter_map(|res| match res {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter_map(move |entry| to_walk_entry(entry, config))
}

fn normalize_newlines(text: String) -> String {
    if !text.contains('\r') {
        return text;
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Decodes as UTF-8, falling back to Latin-1, which accepts every byte.
pub fn decode_text(bytes: Vec<u8>) -> DecodedContent {
    match String::from_utf8(bytes) {
        Ok(text) => DecodedContent::Utf8(normalize_newlines(text)),
        Err(err) => {
            let text: String = err.into_bytes().into_iter().map(char::from).collect();
            DecodedContent::Latin1(normalize_newlines(text))
        }
    }
}

pub fn read_text(path: &Path) -> DecodedContent {
    debug!("Reading file contents: {}", path.display());
    match fs::read(path) {
        Ok(bytes) => {
            debug!("Read {} bytes from file", bytes.len());
            decode_text(bytes)
        }
        Err(e) => {
            warn!("Error reading file {}: {}", path.display(), e);
            DecodedContent::Failed(e.to_string())
        }
    }
}
