use env_logger::Builder;
use log::Level;
use std::io::Write;

pub const LOG_LEVEL_ENV: &str = "PROJECT_CONTENT_LOG_LEVEL";

fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Installs the global logger. `-v` raises the level from warn to info, `-vv`
/// to debug; `PROJECT_CONTENT_LOG_LEVEL` overrides both.
pub fn setup_logger(verbosity: u8) -> Result<(), log::SetLoggerError> {
    let env = env_logger::Env::default().filter_or(LOG_LEVEL_ENV, level_for(verbosity));

    Builder::from_env(env)
        .format(|buf, record| {
            let level_color = match record.level() {
                Level::Error => "31",
                Level::Warn => "33",
                Level::Info => "32",
                _ => "36",
            };

            writeln!(
                buf,
                "\x1B[{}m{:<5}\x1B[0m [{}] {}: {}",
                level_color,
                record.level(),
                buf.timestamp(),
                record.target(),
                record.args()
            )
        })
        .format_timestamp_secs()
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_logger_installs_once() {
        let _ = setup_logger(0);
        assert!(setup_logger(2).is_err());
    }

    #[test]
    fn test_level_for() {
        assert_eq!(level_for(0), "warn");
        assert_eq!(level_for(1), "info");
        assert_eq!(level_for(2), "debug");
        assert_eq!(level_for(9), "debug");
    }
}
