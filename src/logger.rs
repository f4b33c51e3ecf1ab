use std::{env, fs::File};

use anyhow::{anyhow, Result};
use simplelog::{Config, LevelFilter, WriteLogger};

/// Environment variable naming the file diagnostics are written to.
///
/// Logging stays off when unset: stdin/stdout belong to the forkserver
/// protocol and stdout/stderr are redirected to the sink during setup, so
/// there is no standard stream to write to.
pub const LOG_FILE_ENV_VAR: &str = "FORKSRV_SHIM_LOG";

/// Environment variable selecting the log level, `info` when unset.
pub const LOG_LEVEL_ENV_VAR: &str = "FORKSRV_SHIM_LOG_LEVEL";

pub struct Logger;

impl Logger {
    pub fn init() -> Result<()> {
        let Some(path) = env::var_os(LOG_FILE_ENV_VAR) else {
            return Ok(());
        };

        let filter = match env::var(LOG_LEVEL_ENV_VAR) {
            Ok(level) => level
                .parse::<LevelFilter>()
                .map_err(|e| anyhow!("Bad {LOG_LEVEL_ENV_VAR} value {level:?}: {e:}"))?,
            Err(_) => LevelFilter::Info,
        };

        if filter != LevelFilter::Off {
            let logfile = File::create(&path)
                .map_err(|e| anyhow!("Failed to open log file {path:?}: {e:}"))?;
            WriteLogger::init(filter, Config::default(), logfile)
                .map_err(|e| anyhow!("Failed to initalize logger: {e:}"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use simplelog::LevelFilter;

    #[test]
    fn level_names_parse_case_insensitively() {
        assert_eq!("warn".parse::<LevelFilter>().unwrap(), LevelFilter::Warn);
        assert_eq!("TRACE".parse::<LevelFilter>().unwrap(), LevelFilter::Trace);
        assert!("noisy".parse::<LevelFilter>().is_err());
    }
}
