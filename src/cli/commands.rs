use crate::core::aggregator::generate;
use crate::domain::models::{
    DEFAULT_BIND, DEFAULT_EXCLUDE_DIRS, DEFAULT_EXCLUDE_FILES, DEFAULT_EXTENSIONS, DEFAULT_OUTPUT,
    DEFAULT_PORT, DEFAULT_SERVE_DIR, DumpConfig, ServeConfig,
};
use crate::infra::logger::setup_logger;
use crate::infra::output::Console;
use crate::server;
use clap::{Parser, Subcommand};
use log::{debug, info};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "project-content")]
#[command(
    about = "Dump a project's tree and sources into one file, or serve a directory over HTTP",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the filtered directory tree and file contents into one text file
    Dump {
        #[arg(long, default_value = ".")]
        root: String,

        /// Output file, or "-" for stdout
        #[arg(long, default_value = DEFAULT_OUTPUT)]
        output: String,

        /// Comma-separated filename suffixes to include
        #[arg(long)]
        ext: Option<String>,

        /// Comma-separated directory names to skip entirely
        #[arg(long)]
        exclude_dirs: Option<String>,

        /// Comma-separated file names listed without their contents
        #[arg(long)]
        exclude_files: Option<String>,
    },
    /// Serve a directory as static files over HTTP
    Serve {
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,

        #[arg(long, default_value = DEFAULT_SERVE_DIR)]
        dir: String,

        #[arg(long, default_value = DEFAULT_BIND)]
        bind: String,
    },
}

fn split_list(value: Option<&str>, defaults: &[&str]) -> Vec<String> {
    match value {
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        None => defaults.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logger(cli.verbose)?;

    match cli.command {
        Commands::Dump {
            root,
            output,
            ext,
            exclude_dirs,
            exclude_files,
        } => {
            info!("Starting dump command");
            let config = DumpConfig {
                root: PathBuf::from(root),
                output: PathBuf::from(output),
                extensions: split_list(ext.as_deref(), DEFAULT_EXTENSIONS),
                exclude_dirs: split_list(exclude_dirs.as_deref(), DEFAULT_EXCLUDE_DIRS)
                    .into_iter()
                    .collect(),
                exclude_files: split_list(exclude_files.as_deref(), DEFAULT_EXCLUDE_FILES)
                    .into_iter()
                    .collect(),
            };
            dump(&config)?;
        }
        Commands::Serve { port, dir, bind } => {
            info!("Starting serve command");
            let config = ServeConfig {
                port,
                directory: PathBuf::from(dir),
                bind,
            };
            debug!("Serve configuration: {:?}", config);
            server::run(&config)?;
        }
    }
    Ok(())
}

fn dump(config: &DumpConfig) -> anyhow::Result<()> {
    debug!("Dump configuration: {:?}", config);

    let console = Console::for_output(&config.output);
    let root = std::path::absolute(&config.root).unwrap_or_else(|_| config.root.clone());
    console.notice(&format!("Starting directory: {}", root.display()))?;
    console.notice(&format!("Output file: {}", config.output.display()))?;
    console.notice(&format!("Excluding directories: {:?}", config.exclude_dirs))?;
    console.notice(&format!("Excluding content of files: {:?}", config.exclude_files))?;

    let summary = generate(config)?;
    debug!("Dump summary: {:?}", summary);

    console.success(&format!(
        "Successfully generated project content file: {}",
        config.output.display()
    ))?;
    Ok(())
}
