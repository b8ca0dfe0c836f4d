use std::collections::BTreeSet;
use std::path::PathBuf;

pub const DEFAULT_OUTPUT: &str = "project_content.txt";

pub const DEFAULT_EXTENSIONS: &[&str] = &[
    ".py", ".html", ".css", ".js", ".json", ".md", ".txt", ".yaml", ".yml", ".toml",
];

pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    ".git",
    "__pycache__",
    ".pytest_cache",
    "node_modules",
    "build",
    "dist",
    "old2",
    "testing-bundles",
    "static",
    ".venv",
    "venv",
    "env",
    ".env",
];

pub const DEFAULT_EXCLUDE_FILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "katex.min.css",
    "katex.min.js",
    "FileSaver.min.js",
    "html2canvas.min.js",
    "jszip.min.js",
    "write_content_to_file.py",
    "project_content.txt",
    "toolbar.test.js",
    "view-selector.test.js",
    "view-selector.visual-test.js",
    "colorbar.visual-test.js",
];

pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_SERVE_DIR: &str = "public";
pub const DEFAULT_BIND: &str = "0.0.0.0";

/// Names starting with this marker are treated as hidden and skipped.
pub const HIDDEN_MARKER: char = '.';

#[derive(Debug, Clone)]
pub struct DumpConfig {
    pub root: PathBuf,
    pub output: PathBuf,
    /// Kept in the order given; matching is a plain suffix test.
    pub extensions: Vec<String>,
    pub exclude_dirs: BTreeSet<String>,
    pub exclude_files: BTreeSet<String>,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            output: PathBuf::from(DEFAULT_OUTPUT),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
            exclude_files: DEFAULT_EXCLUDE_FILES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub port: u16,
    pub directory: PathBuf,
    pub bind: String,
}

impl ServeConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            directory: PathBuf::from(DEFAULT_SERVE_DIR),
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// A directory or file that survived pruning and filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub kind: EntryKind,
    /// Absolute (or root-joined) path used for reading.
    pub path: PathBuf,
    /// Path relative to the root, `/`-separated. Empty for the root itself.
    pub relative: String,
    /// Walk depth: 0 for the root, 1 for its direct children.
    pub depth: usize,
}

impl WalkEntry {
    pub fn name(&self) -> &str {
        self.relative.rsplit('/').next().unwrap_or("")
    }

    pub fn is_root(&self) -> bool {
        self.depth == 0
    }
}

/// Outcome of reading one file as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedContent {
    Utf8(String),
    /// The bytes were not valid UTF-8 and were decoded as Latin-1.
    Latin1(String),
    Failed(String),
}
