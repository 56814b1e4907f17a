//! CLI front-end: command parsing and dispatch helpers used by the
//! `jimports` binary.

pub mod dispatch;

use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use crate::logging::{LogFormat, LogLevel, LogSettings};

/// Failure to understand the command line.
#[derive(Debug)]
pub struct CliError {
    message: String,
}

impl CliError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for CliError {}

/// Parsed command line.
#[derive(Debug)]
pub struct Cli {
    pub command: Command,
    pub log: LogSettings,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Compute and apply the import block.
    Fix { inputs: Vec<PathBuf>, write: bool },
    /// Report missing/unused imports without writing.
    Check { inputs: Vec<PathBuf> },
    Version,
    Help,
}

pub(crate) const USAGE: &str = "\
jimports — automatic import manager for Java source files

USAGE:
    jimports <COMMAND> [OPTIONS] [FILES]

COMMANDS:
    fix <files...>      rewrite each file's import block (stdout unless --write)
    check <files...>    report files whose imports are missing or unused
    version             print version information
    help                print this message

OPTIONS:
    -w, --write             write fixed files in place
        --log-level <lvl>   error|warn|info|debug|trace
        --log-format <fmt>  auto|text|json
";

impl Cli {
    /// Parse arguments (without the program name).
    pub fn parse_from<I, S>(args: I) -> Result<Cli, CliError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::into);
        let Some(command) = args.next() else {
            return Err(CliError::new(format!("missing command\n\n{USAGE}")));
        };

        let mut log = LogSettings::default();
        let mut inputs: Vec<PathBuf> = Vec::new();
        let mut write = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-w" | "--write" => write = true,
                "--log-level" => {
                    let value = args
                        .next()
                        .ok_or_else(|| CliError::new("--log-level requires a value"))?;
                    let level = LogLevel::parse(&value)
                        .ok_or_else(|| CliError::new(format!("unknown log level `{value}`")))?;
                    log.apply_level(level);
                }
                "--log-format" => {
                    let value = args
                        .next()
                        .ok_or_else(|| CliError::new("--log-format requires a value"))?;
                    let format = LogFormat::parse(&value)
                        .ok_or_else(|| CliError::new(format!("unknown log format `{value}`")))?;
                    log.apply_format(format);
                }
                flag if flag.starts_with('-') => {
                    return Err(CliError::new(format!("unknown option `{flag}`")));
                }
                path => inputs.push(PathBuf::from(path)),
            }
        }

        let command = match command.as_str() {
            "fix" => {
                if inputs.is_empty() {
                    return Err(CliError::new("fix requires at least one file or directory"));
                }
                Command::Fix { inputs, write }
            }
            "check" => {
                if inputs.is_empty() {
                    return Err(CliError::new(
                        "check requires at least one file or directory",
                    ));
                }
                Command::Check { inputs }
            }
            "version" | "--version" | "-V" => Command::Version,
            "help" | "--help" | "-h" => Command::Help,
            other => {
                return Err(CliError::new(format!(
                    "unknown command `{other}`\n\n{USAGE}"
                )));
            }
        };

        if write && !matches!(command, Command::Fix { .. }) {
            return Err(CliError::new("--write only applies to fix"));
        }

        Ok(Cli { command, log })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fix_with_write_flag() {
        let cli = Cli::parse_from(["fix", "--write", "App.java"]).expect("parse");
        match cli.command {
            Command::Fix { inputs, write } => {
                assert!(write);
                assert_eq!(inputs, vec![PathBuf::from("App.java")]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_check_with_logging_overrides() {
        let cli = Cli::parse_from(["check", "--log-level", "debug", "src"]).expect("parse");
        assert!(matches!(cli.command, Command::Check { .. }));
        assert_eq!(cli.log.level, Some(crate::logging::LogLevel::Debug));
    }

    #[test]
    fn rejects_missing_inputs_and_unknown_commands() {
        assert!(Cli::parse_from(["fix"]).is_err());
        assert!(Cli::parse_from(["frobnicate"]).is_err());
        assert!(Cli::parse_from(Vec::<String>::new()).is_err());
    }

    #[test]
    fn write_is_rejected_outside_fix() {
        let err = Cli::parse_from(["check", "--write", "App.java"]).expect_err("reject");
        assert!(err.to_string().contains("--write"));
    }

    #[test]
    fn version_aliases_parse() {
        assert!(matches!(
            Cli::parse_from(["--version"]).expect("parse").command,
            Command::Version
        ));
        assert!(matches!(
            Cli::parse_from(["-h"]).expect("parse").command,
            Command::Help
        ));
    }
}
