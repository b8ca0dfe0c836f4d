use anyhow::Context;
use crossterm::{
    ExecutableCommand,
    style::{Color, ResetColor, SetForegroundColor},
};
use log::debug;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Path that selects standard output instead of a file.
pub const STDOUT_PATH: &str = "-";

/// Opens the dump destination. The file is created (or truncated) right away.
pub fn create_writer(path: &Path) -> anyhow::Result<Box<dyn Write>> {
    if path == Path::new(STDOUT_PATH) {
        debug!("Writing output to console");
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }

    debug!("Writing output to file: {}", path.display());
    let file = File::create(path)
        .with_context(|| format!("Error opening output file {}", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}

fn print_colored<W: Write>(mut out: W, color: Color, message: &str) -> io::Result<()> {
    out.execute(SetForegroundColor(color))?;
    write!(out, "{}", message)?;
    out.execute(ResetColor)?;
    writeln!(out)?;
    out.flush()
}

/// Where operator-facing status lines go. They move to stderr when the
/// artifact itself is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Console {
    Stdout,
    Stderr,
}

impl Console {
    pub fn for_output(output: &Path) -> Self {
        if output == Path::new(STDOUT_PATH) {
            Console::Stderr
        } else {
            Console::Stdout
        }
    }

    fn writer(self) -> Box<dyn Write> {
        match self {
            Console::Stdout => Box::new(io::stdout()),
            Console::Stderr => Box::new(io::stderr()),
        }
    }

    pub fn notice(self, message: &str) -> io::Result<()> {
        write_line(self.writer(), message)
    }

    pub fn success(self, message: &str) -> io::Result<()> {
        print_colored(self.writer(), Color::Green, message)
    }
}

fn write_line<W: Write>(mut out: W, message: &str) -> io::Result<()> {
    writeln!(out, "{}", message)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_create_writer_truncates_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.txt");
        fs::write(&path, "stale contents").unwrap();

        {
            let mut writer = create_writer(&path).unwrap();
            writer.write_all("├── fresh".as_bytes()).unwrap();
            writer.flush().unwrap();
        }

        assert_eq!(fs::read_to_string(&path).unwrap(), "├── fresh");
    }

    #[test]
    fn test_create_writer_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing/out.txt");

        let err = create_writer(&path).err().unwrap();
        assert!(err.to_string().contains("Error opening output file"));
    }

    #[test]
    fn test_console_moves_to_stderr_for_stdout_output() {
        assert_eq!(Console::for_output(Path::new(STDOUT_PATH)), Console::Stderr);
        assert_eq!(Console::for_output(Path::new("project_content.txt")), Console::Stdout);
        assert_eq!(Console::for_output(Path::new("./-")), Console::Stdout);
    }

    #[test]
    fn test_write_line_is_plain() {
        let mut buffer = Vec::new();
        write_line(&mut buffer, "Output file: -").unwrap();

        assert_eq!(String::from_utf8(buffer).unwrap(), "Output file: -\n");
    }

    #[test]
    fn test_print_colored_wraps_message() {
        let mut buffer = Vec::new();
        print_colored(&mut buffer, Color::Green, "done").unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("done"));
        assert!(text.ends_with('\n'));
    }
}
