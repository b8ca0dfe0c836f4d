use super::error::ServeError;
use log::warn;
use std::path::Path;

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
    pub is_symlink: bool,
}

impl ListingEntry {
    fn href(&self) -> String {
        let encoded = urlencoding::encode(&self.name).into_owned();
        if self.is_dir { encoded + "/" } else { encoded }
    }

    fn label(&self) -> String {
        if self.is_symlink {
            format!("{}@", self.name)
        } else if self.is_dir {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Reads a directory's entries sorted case-insensitively by name.
pub async fn read_listing(dir: &Path) -> Result<Vec<ListingEntry>, ServeError> {
    let mut read_dir = tokio::fs::read_dir(dir).await.map_err(|e| {
        warn!("Cannot list {}: {}", dir.display(), e);
        ServeError::ListingDenied
    })?;

    let mut entries = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_symlink = entry.file_type().await?.is_symlink();
        // Follows symlinks, so a link to a directory is listed as one.
        let is_dir = tokio::fs::metadata(entry.path())
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        entries.push(ListingEntry {
            name,
            is_dir,
            is_symlink,
        });
    }

    entries.sort_by_key(|e| e.name.to_lowercase());
    Ok(entries)
}

/// Renders the HTML page for a directory. `display_path` is the decoded
/// request path.
pub fn render_listing(display_path: &str, entries: &[ListingEntry]) -> String {
    let title = format!("Directory listing for {}", html_escape(display_path));

    let mut lines = vec![
        "<!DOCTYPE HTML>".to_string(),
        "<html lang=\"en\">".to_string(),
        "<head>".to_string(),
        "<meta charset=\"utf-8\">".to_string(),
        format!("<title>{}</title>\n</head>", title),
        format!("<body>\n<h1>{}</h1>", title),
        "<hr>\n<ul>".to_string(),
    ];

    for entry in entries {
        lines.push(format!(
            "<li><a href=\"{}\">{}</a></li>",
            entry.href(),
            html_escape(&entry.label())
        ));
    }

    lines.push("</ul>\n<hr>\n</body>\n</html>\n".to_string());
    lines.join("\n")
}
