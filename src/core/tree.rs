use crate::domain::models::{DumpConfig, EntryKind, WalkEntry};
use crate::infra::file_system::walk_filtered;

const BRANCH: &str = "├── ";
const CONTINUATION: &str = "│   ";

/// Nesting level of a directory: the number of separators in its relative
/// path, so top-level subdirectories sit at level 0 next to the root's files.
fn directory_level(depth: usize) -> usize {
    depth.saturating_sub(1)
}

pub fn render_line(entry: &WalkEntry) -> String {
    match entry.kind {
        EntryKind::Directory if entry.is_root() => ".".to_string(),
        EntryKind::Directory => {
            let level = directory_level(entry.depth);
            if level > 0 {
                format!("{}{}{}/", CONTINUATION.repeat(level - 1), BRANCH, entry.name())
            } else {
                format!("{}/", entry.name())
            }
        }
        EntryKind::File => {
            let parent_level = directory_level(entry.depth.saturating_sub(1));
            format!("{}{}{}", CONTINUATION.repeat(parent_level), BRANCH, entry.name())
        }
    }
}

/// Lazily renders the filtered tree, one line per retained entry, without
/// reading any file contents.
pub fn tree_lines(config: &DumpConfig) -> impl Iterator<Item = String> + '_ {
    walk_filtered(config).map(|entry| render_line(&entry))
}
