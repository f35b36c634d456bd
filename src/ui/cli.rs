// Command-line interface definitions and parsing for gdpr-report

use crate::config::CliConfig;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Options shared by every report
#[derive(Args, Debug, Default, Clone)]
pub struct GlobalArgs {
    // Platform Access
    /// Base URL of the platform (or DSS_URL)
    #[arg(long, global = true, value_name = "URL", help_heading = "Platform Access")]
    pub url: Option<String>,

    /// API key (or DSS_API_KEY)
    #[arg(long, global = true, value_name = "KEY", help_heading = "Platform Access")]
    pub api_key: Option<String>,

    /// Project the report is generated for
    #[arg(long, global = true, value_name = "KEY", help_heading = "Platform Access")]
    pub project: Option<String>,

    // Output & Verbosity
    /// Write the HTML report to a file instead of stdout
    #[arg(
        short = 'o',
        long,
        global = true,
        value_name = "FILE",
        help_heading = "Output & Verbosity"
    )]
    pub output: Option<String>,

    /// Suppress progress and log output
    #[arg(short = 'q', long, global = true, help_heading = "Output & Verbosity")]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true, help_heading = "Output & Verbosity")]
    pub verbose: bool,

    /// Disable the progress bar
    #[arg(long, global = true, help_heading = "Output & Verbosity")]
    pub no_progress: bool,

    // Network & Security
    /// Request timeout in seconds (default: 30)
    #[arg(
        short = 't',
        long,
        global = true,
        value_name = "SECONDS",
        help_heading = "Network & Security"
    )]
    pub timeout: Option<u64>,

    /// Custom User-Agent header
    #[arg(long, global = true, value_name = "AGENT", help_heading = "Network & Security")]
    pub user_agent: Option<String>,

    /// Skip SSL certificate verification
    #[arg(long, global = true, help_heading = "Network & Security")]
    pub insecure: bool,

    // Configuration
    /// Use specific config file
    #[arg(long, global = true, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Ignore config files
    #[arg(long, global = true, help_heading = "Configuration")]
    pub no_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// GDPR audit of connections, projects and data assets
    Audit {
        /// Cover every project of the instance
        #[arg(long)]
        all_projects: bool,

        /// Leave out the connections section
        #[arg(long)]
        no_connections: bool,

        /// Leave out the projects section
        #[arg(long)]
        no_projects: bool,

        /// Leave out the all-objects section
        #[arg(long)]
        no_objects: bool,

        /// Add the policy violations section
        #[arg(long)]
        policy_violations: bool,
    },
    /// List datasets whose GDPR documentation is incomplete
    Checkup {
        /// Cover every project of the instance
        #[arg(long)]
        all_projects: bool,

        /// Also list datasets already classified YES or NO
        #[arg(long)]
        include_classified: bool,
    },
    /// Generate shell completions
    #[command(arg_required_else_help = true)]
    Completion {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Convert the parsed arguments into a CliConfig
pub fn cli_to_config(cli: &Cli) -> CliConfig {
    let global = &cli.global;
    let mut cli_config = CliConfig {
        url: global.url.clone(),
        api_key: global.api_key.clone(),
        project_key: global.project.clone(),
        output: global.output.clone(),
        quiet: global.quiet,
        verbose: global.verbose,
        no_progress: global.no_progress,
        timeout: global.timeout,
        user_agent: global.user_agent.clone(),
        skip_ssl_verification: global.insecure,
        config_file: global.config.clone(),
        no_config: global.no_config,
        ..Default::default()
    };

    match cli.command {
        Commands::Audit {
            all_projects,
            no_connections,
            no_projects,
            no_objects,
            policy_violations,
        } => {
            cli_config.all_projects = all_projects;
            cli_config.no_connections = no_connections;
            cli_config.no_projects = no_projects;
            cli_config.no_objects = no_objects;
            cli_config.policy_violations = policy_violations;
        }
        Commands::Checkup {
            all_projects,
            include_classified,
        } => {
            cli_config.all_projects = all_projects;
            cli_config.include_classified = include_classified;
        }
        Commands::Completion { .. } => {}
    }

    cli_config
}
