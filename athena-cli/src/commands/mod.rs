pub mod agents;
pub mod auth;
pub mod chat;
pub mod config;
pub mod connection;
pub mod train;

pub use agents::{handle_agents_command, AgentsCommand};
pub use auth::{cmd_dashboard, cmd_login, cmd_logout, cmd_whoami};
pub use chat::{handle_chat_command, ChatCommand};
pub use config::{handle_config_command, ConfigCommand};
pub use connection::cmd_test_connection;
pub use train::cmd_train;

use std::io::{BufRead, Write};

/// Print `prompt` and read one line from stdin, without the trailing newline.
pub(crate) fn prompt_line(prompt: &str) -> anyhow::Result<String> {
    print!("{}", prompt);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub(crate) fn confirm(prompt: &str) -> bool {
    prompt_line(&format!("{} [y/N] ", prompt))
        .map(|answer| matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
        .unwrap_or(false)
}
