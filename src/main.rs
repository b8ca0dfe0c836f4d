mod cli;
mod core;
mod domain;
mod infra;
mod server;

use cli::commands::run;

fn main() -> anyhow::Result<()> {
    run()
}
