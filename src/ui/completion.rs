//! Shell completion generation for gdpr-report

use clap::CommandFactory;
use clap_complete::{Shell, generate};

use crate::ui::cli::Cli;

/// Write the completion script for `shell` to stdout
pub fn print_completions(shell: Shell) {
    print!("{}", completion_script(shell));
}

/// Completion script for `shell` as a string
pub fn completion_script(shell: Shell) -> String {
    let mut app = Cli::command();
    let name = app.get_name().to_string();
    let mut buffer = Vec::new();
    generate(shell, &mut app, name, &mut buffer);
    String::from_utf8_lossy(&buffer).into_owned()
}
