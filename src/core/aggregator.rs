use crate::core::tree::tree_lines;
use crate::domain::models::{DecodedContent, DumpConfig, EntryKind};
use crate::infra::file_system::{read_text, walk_filtered};
use crate::infra::output::create_writer;
use anyhow::{Context, bail};
use log::{debug, info};
use std::io::Write;
use std::path::{Path, PathBuf};

const STRUCTURE_HEADER: &str = "=== Project Directory Structure ===";
const STRUCTURE_BLURB: &str = "Relevant files and folders (excluding specified patterns):";
const CONTENTS_HEADER: &str = "=== File Contents ===";
const EXCLUDED_PLACEHOLDER: &str = "--- CONTENT EXCLUDED (listed in exclude_files) ---";
const LATIN1_WARNING: &str = "--- (Warning: Read using latin-1 encoding) ---";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DumpSummary {
    pub tree_lines: usize,
    pub files: usize,
    pub excluded: usize,
    pub fallbacks: usize,
    pub failures: usize,
}

fn write_structure<W: Write>(
    config: &DumpConfig,
    root_display: &Path,
    out: &mut W,
) -> std::io::Result<usize> {
    writeln!(out, "{}", STRUCTURE_HEADER)?;
    writeln!(out, "Root: {}", root_display.display())?;
    writeln!(out, "{}\n", STRUCTURE_BLURB)?;

    let mut count = 0;
    for line in tree_lines(config) {
        writeln!(out, "{}", line)?;
        count += 1;
    }
    debug!("Wrote {} tree lines", count);
    Ok(count)
}

fn write_contents<W: Write>(
    config: &DumpConfig,
    out: &mut W,
    summary: &mut DumpSummary,
) -> std::io::Result<()> {
    write!(out, "\n\n{}\n\n", CONTENTS_HEADER)?;

    for entry in walk_filtered(config).filter(|e| e.kind == EntryKind::File) {
        writeln!(out, "=== {} ===", entry.relative)?;
        summary.files += 1;

        if config.exclude_files.contains(entry.name()) {
            debug!("Content excluded: {}", entry.relative);
            writeln!(out, "{}", EXCLUDED_PLACEHOLDER)?;
            summary.excluded += 1;
        } else {
            match read_text(&entry.path) {
                DecodedContent::Utf8(text) => out.write_all(text.as_bytes())?,
                DecodedContent::Latin1(text) => {
                    info!("Read {} using latin-1 fallback", entry.relative);
                    out.write_all(text.as_bytes())?;
                    write!(out, "\n{}\n", LATIN1_WARNING)?;
                    summary.fallbacks += 1;
                }
                DecodedContent::Failed(reason) => {
                    writeln!(out, "--- Error reading file: {} ---", reason)?;
                    summary.failures += 1;
                }
            }
        }

        out.write_all(b"\n\n")?;
    }

    Ok(())
}

/// Writes the whole artifact: the tree section first, then every file's
/// contents, re-walking the tree with the same pruning.
pub fn write_document<W: Write>(
    config: &DumpConfig,
    root_display: &Path,
    out: &mut W,
) -> std::io::Result<DumpSummary> {
    let mut summary = DumpSummary {
        tree_lines: write_structure(config, root_display, out)?,
        ..DumpSummary::default()
    };
    write_contents(config, out, &mut summary)?;
    out.flush()?;
    Ok(summary)
}

/// Resolves the root to an absolute path and checks it is a directory.
pub fn resolve_root(root: &Path) -> anyhow::Result<PathBuf> {
    let absolute = std::path::absolute(root)
        .with_context(|| format!("Could not resolve starting directory: {}", root.display()))?;

    if !absolute.exists() {
        bail!("Starting directory not found: {}", absolute.display());
    }
    if !absolute.is_dir() {
        bail!("Starting path is not a directory: {}", absolute.display());
    }

    Ok(absolute)
}

/// Runs one dump. The root is checked before the output file is created, so
/// a missing root never leaves an output file behind.
pub fn generate(config: &DumpConfig) -> anyhow::Result<DumpSummary> {
    let root = resolve_root(&config.root)?;
    let config = DumpConfig {
        root: root.clone(),
        ..config.clone()
    };

    info!("Generating project content for {}", root.display());
    let mut writer = create_writer(&config.output)?;

    let summary = write_document(&config, &root, &mut writer)
        .with_context(|| format!("Error writing to output file {}", config.output.display()))?;

    info!(
        "Wrote {} files ({} excluded, {} latin-1, {} unreadable)",
        summary.files, summary.excluded, summary.fallbacks, summary.failures
    );
    Ok(summary)
}
