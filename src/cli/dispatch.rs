//! Command execution: logging setup, driver invocation, and reporting.

use std::fs;
use std::path::PathBuf;

use tracing::error;

use super::{Cli, CliError, Command, USAGE};
use crate::diagnostics::Severity;
use crate::driver::{FixReport, ImportDriver};
use crate::environment::ProjectEnvironment;
use crate::error::{Error, Result};
use crate::logging::{LogFormat, LogLevel, LogOptions};
use crate::version;

/// Run a parsed command to completion.
pub fn run(driver: &ImportDriver, cli: Cli) -> Result<()> {
    let options = cli.log.merged_with_env().resolved();
    init_logging(&options);

    match cli.command {
        Command::Version => {
            println!("{}", version::banner());
            Ok(())
        }
        Command::Help => {
            println!("{USAGE}");
            Ok(())
        }
        Command::Fix { inputs, write } => run_fix(driver, &inputs, write),
        Command::Check { inputs } => run_check(driver, &inputs),
    }
}

/// Print a failure the way the binary reports it.
pub fn report_error(err: &Error) {
    if let Error::Parse(parse) = err {
        let options = crate::diagnostics::FormatOptions {
            format: crate::diagnostics::ErrorFormat::Short,
            color: crate::diagnostics::ColorMode::Never,
            is_terminal: false,
        };
        let rendered =
            crate::diagnostics::format_diagnostics(parse.diagnostics(), parse.files(), options);
        if !rendered.is_empty() {
            eprintln!("{rendered}");
        }
    }
    eprintln!("error: {err}");
}

fn run_fix(driver: &ImportDriver, inputs: &[PathBuf], write: bool) -> Result<()> {
    let files = expand_inputs(inputs)?;
    let reports = driver.fix_paths(&files);
    let mut failed = 0usize;
    let single = files.len() == 1;
    for report in reports {
        match report {
            Ok(report) => {
                emit_environment_diagnostics(&report);
                if write {
                    if !report.is_clean() {
                        fs::write(&report.file, &report.rewritten)?;
                    }
                    eprintln!("{}", report.summary());
                } else if single {
                    print!("{}", report.rewritten);
                } else {
                    eprintln!("{}", report.summary());
                }
            }
            Err(err) => {
                failed += 1;
                error!(error = %err, "fix failed");
                report_error(&err);
            }
        }
    }
    if failed > 0 {
        return Err(Error::Cli(CliError::new(format!(
            "failed to fix {failed} file(s)"
        ))));
    }
    Ok(())
}

fn run_check(driver: &ImportDriver, inputs: &[PathBuf]) -> Result<()> {
    let files = expand_inputs(inputs)?;
    let reports = driver.fix_paths(&files);
    let mut dirty = 0usize;
    let mut failed = 0usize;
    for report in reports {
        match report {
            Ok(report) => {
                emit_environment_diagnostics(&report);
                if !report.is_clean() {
                    dirty += 1;
                    println!("{}", report.summary());
                    for line in &report.added {
                        println!("  missing: {line}");
                    }
                    for line in &report.removed {
                        println!("  unused:  {line}");
                    }
                }
                for name in &report.unresolvable {
                    println!("  unresolvable: {name}");
                }
            }
            Err(err) => {
                failed += 1;
                report_error(&err);
            }
        }
    }
    if failed > 0 {
        return Err(Error::Cli(CliError::new(format!(
            "failed to check {failed} file(s)"
        ))));
    }
    if dirty > 0 {
        return Err(Error::Cli(CliError::new(format!(
            "{dirty} file(s) have imports out of date"
        ))));
    }
    Ok(())
}

fn emit_environment_diagnostics(report: &FixReport) {
    for diagnostic in &report.diagnostics {
        match diagnostic.severity {
            Severity::Error => error!("{diagnostic}"),
            _ => tracing::warn!("{diagnostic}"),
        }
    }
}

fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(ProjectEnvironment::project_sources(input));
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            return Err(Error::Cli(CliError::new(format!(
                "no such file or directory: {}",
                input.display()
            ))));
        }
    }
    if files.is_empty() {
        return Err(Error::Cli(CliError::new(
            "no source files found under the given inputs",
        )));
    }
    Ok(files)
}

fn init_logging(options: &LogOptions) {
    use std::io::IsTerminal;
    use std::sync::OnceLock;
    use tracing_subscriber::{EnvFilter, fmt};

    static INITIALISED: OnceLock<()> = OnceLock::new();

    let _ = INITIALISED.get_or_init(|| {
        let use_ansi = std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal();
        let level = options.level.as_tracing_level();
        let make_filter = || {
            let directive = options.level.to_string();
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
        };

        match options.format {
            LogFormat::Json => {
                let subscriber = fmt::fmt()
                    .with_env_filter(make_filter())
                    .with_max_level(level)
                    .with_ansi(use_ansi)
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .json()
                    .finish();
                let _ = tracing::subscriber::set_global_default(subscriber);
            }
            _ => {
                let subscriber = fmt::fmt()
                    .with_env_filter(make_filter())
                    .with_max_level(level)
                    .with_ansi(use_ansi)
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .compact()
                    .finish();
                let _ = tracing::subscriber::set_global_default(subscriber);
            }
        }
    });
}
