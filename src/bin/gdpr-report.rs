use clap::Parser;
use gdpr_report::config::{CliConfig, Config};
use gdpr_report::platform::{DssClient, PlatformApi};
use gdpr_report::reporting::logging;
use gdpr_report::reporting::{AuditReport, CheckupReport, Report};
use gdpr_report::ui::print_completions;
use gdpr_report::ui::{Cli, Commands, ProgressReporter, cli_to_config};

use std::fs;
use std::path::Path;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Handle completion commands first
    if let Some(exit_code) = handle_completion_commands(&cli) {
        std::process::exit(exit_code);
    }

    match run_report_logic(&cli).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Handle completion commands and return exit code if a completion command was processed
pub fn handle_completion_commands(cli: &Cli) -> Option<i32> {
    match cli.command {
        Commands::Completion { shell } => {
            print_completions(shell);
            Some(0)
        }
        Commands::Audit { .. } | Commands::Checkup { .. } => None,
    }
}

/// Main report logic extracted from main() for testing
pub async fn run_report_logic(cli: &Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let cli_config = cli_to_config(cli);
    let config = load_and_merge_config(&cli_config)?;

    logging::init_logger(config.verbose.unwrap_or(false), cli_config.quiet);
    config.validate_for_run().inspect_err(|e| {
        logging::log_error("Invalid configuration", Some(e));
    })?;
    logging::log_config_info(&config);

    let client = DssClient::from_config(&config)?;
    let Some(report) = build_report(cli, &config, &client)? else {
        return Ok(0);
    };

    let show_progress = ProgressReporter::should_display(cli_config.quiet, cli_config.no_progress);
    let mut progress = ProgressReporter::new(show_progress, report.progress_target());
    let result = report.run(&mut progress).await;
    progress.finish_and_clear();
    let html = result.inspect_err(|e| {
        logging::log_error("Report generation failed", Some(e));
    })?;

    write_report(&html, config.output.as_deref())?;
    if let Some(ref path) = config.output
        && !cli_config.quiet
    {
        eprintln!("Report written to {path}");
    }

    Ok(0)
}

/// Load configuration from file or standard locations, then apply the
/// environment and CLI arguments on top
pub fn load_and_merge_config(cli_config: &CliConfig) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if cli_config.no_config {
        Config::default()
    } else if let Some(ref config_file) = cli_config.config_file {
        Config::load_from_file(config_file).inspect_err(|e| {
            logging::log_error(
                &format!("Could not load config file '{config_file}'"),
                Some(e),
            );
        })?
    } else {
        Config::load_from_standard_locations()?
    };

    config.apply_environment();
    // Merge CLI arguments with configuration (CLI takes precedence)
    config.merge_with_cli(cli_config);
    Ok(config)
}

/// Report selected by the subcommand, `None` for non-report commands
pub fn build_report<'a>(
    cli: &Cli,
    config: &Config,
    api: &'a dyn PlatformApi,
) -> Result<Option<Box<dyn Report + 'a>>, Box<dyn std::error::Error>> {
    let report: Box<dyn Report + 'a> = match cli.command {
        Commands::Audit { .. } => Box::new(AuditReport::new(
            api,
            config.project_scope()?,
            config.audit_sections(),
        )),
        Commands::Checkup { .. } => Box::new(CheckupReport::new(
            api,
            config.project_scope()?,
            config.only_unsure(),
        )),
        Commands::Completion { .. } => return Ok(None),
    };
    Ok(Some(report))
}

/// Write the document to `output`, or stdout when unset
pub fn write_report(html: &str, output: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => fs::write(Path::new(path), html).inspect_err(|e| {
            logging::log_error(&format!("Could not write report to '{path}'"), Some(e));
        })?,
        None => print!("{html}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("gdpr-report").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_handle_completion_command() {
        assert_eq!(handle_completion_commands(&parse(&["completion", "zsh"])), Some(0));
        assert_eq!(handle_completion_commands(&parse(&["audit"])), None);
        assert_eq!(handle_completion_commands(&parse(&["checkup"])), None);
    }

    #[test]
    fn test_load_and_merge_config_no_config_flag() {
        let cli_config = CliConfig {
            no_config: true,
            project_key: Some("CRM".to_string()),
            ..Default::default()
        };
        let config = load_and_merge_config(&cli_config).unwrap();
        assert_eq!(config.project_key.as_deref(), Some("CRM"));
        assert_eq!(config.timeout, Some(30));
    }

    #[test]
    fn test_load_and_merge_config_with_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "project_key = \"OPS\"\ntimeout = 12\nonly_unsure = false").unwrap();

        let cli_config = CliConfig {
            config_file: Some(file.path().display().to_string()),
            timeout: Some(45),
            ..Default::default()
        };
        let config = load_and_merge_config(&cli_config).unwrap();
        assert_eq!(config.project_key.as_deref(), Some("OPS"));
        assert_eq!(config.timeout, Some(45));
        assert!(!config.only_unsure());
    }

    #[test]
    fn test_load_and_merge_config_invalid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "timeout = \"soon\"").unwrap();

        let cli_config = CliConfig {
            config_file: Some(file.path().display().to_string()),
            ..Default::default()
        };
        assert!(load_and_merge_config(&cli_config).is_err());
    }

    #[test]
    fn test_build_report_requires_scope() {
        let config = Config {
            url: Some("http://localhost:1".to_string()),
            api_key: Some("key".to_string()),
            ..Default::default()
        };
        let client = DssClient::from_config(&config).unwrap();

        assert!(build_report(&parse(&["audit"]), &config, &client).is_err());
        assert!(
            build_report(&parse(&["completion", "bash"]), &config, &client)
                .unwrap()
                .is_none()
        );

        let scoped = Config {
            all_projects: Some(true),
            ..config
        };
        let report = build_report(&parse(&["checkup"]), &scoped, &client)
            .unwrap()
            .unwrap();
        assert_eq!(report.progress_target().total, 100);
    }

    #[test]
    fn test_write_report_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.html");
        let path_str = path.display().to_string();

        write_report("<html></html>", Some(&path_str)).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<html></html>");
    }

    #[test]
    fn test_write_report_to_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("report.html");
        assert!(write_report("<html></html>", Some(&path.display().to_string())).is_err());
    }
}
