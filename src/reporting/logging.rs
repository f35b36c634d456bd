use log::{debug, error, info};

use crate::config::Config;

/// Initialize the logger with appropriate level based on verbosity
pub fn init_logger(verbose: bool, quiet: bool) {
    // Without flags, RUST_LOG alone decides
    let level = if quiet {
        Some(log::LevelFilter::Off)
    } else if verbose {
        Some(log::LevelFilter::Debug)
    } else if std::env::var_os("RUST_LOG").is_none() {
        Some(log::LevelFilter::Off)
    } else {
        None
    };

    let mut builder = env_logger::Builder::from_default_env();
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder
        .format_module_path(false)
        .format_target(false)
        .try_init()
        .ok();

    debug!("Logger initialized with level: {level:?}");
}

/// Log the settings a report run uses. The API key is never logged.
pub fn log_config_info(config: &Config) {
    let url = config.url.as_deref().unwrap_or("<unset>");
    let project = config.project_key.as_deref().unwrap_or("<unset>");
    let all_projects = config.all_projects.unwrap_or(false);
    let timeout = config.timeout_duration().as_secs();
    let skip_ssl_verification = config.skip_ssl_verification.unwrap_or(false);

    info!("Platform: url={url}, timeout={timeout}s, skip_ssl={skip_ssl_verification}");
    info!("Scope: project={project}, all_projects={all_projects}");
}

/// Log the projects a report covers
pub fn log_scope(project_keys: &[String]) {
    info!("Reporting on {} project(s)", project_keys.len());
    for (i, key) in project_keys.iter().enumerate() {
        debug!("  {}. {}", i + 1, key);
    }
}

pub fn log_phase_start(phase: &str) {
    info!("Building {phase}");
}

pub fn log_phase_complete(phase: &str, rows: usize, progress: u32) {
    info!("Finished {phase}: {rows} row group(s), progress {progress}%");
}

/// Log a single platform request
pub fn log_request(url: &str) {
    debug!("GET {url}");
}

/// Log error information
pub fn log_error(message: &str, source: Option<&dyn std::error::Error>) {
    match source {
        Some(err) => error!("{message}: {err}"),
        None => error!("{message}"),
    }
}
