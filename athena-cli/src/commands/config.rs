use clap::Subcommand;
use colored::Colorize;
use serde_json::json;

use athena_core::get_config_dir;

use crate::config::CliContext;
use crate::output::print_structured;

#[derive(Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Show the resolved configuration")]
    Show,

    #[command(about = "Print the path of the user config file")]
    Path,
}

pub async fn handle_config_command(
    ctx: &CliContext,
    cmd: Option<ConfigCommand>,
) -> anyhow::Result<()> {
    match cmd.unwrap_or(ConfigCommand::Show) {
        ConfigCommand::Show => print_config(ctx),
        ConfigCommand::Path => {
            match get_config_dir() {
                Some(dir) => println!("{}", dir.join("config.toml").display()),
                None => println!("{}", "No config directory on this platform.".yellow()),
            }
            Ok(())
        }
    }
}

pub(crate) fn print_config(ctx: &CliContext) -> anyhow::Result<()> {
    let endpoints = ctx.client.endpoints();
    let config = &ctx.config;

    let value = json!({
        "endpoints": endpoints,
        "http": config.http,
        "session": {"path": ctx.session_path, "signed_in": ctx.session.is_authenticated()},
        "logging": config.logging,
    });
    if print_structured(ctx.format, &value)? {
        return Ok(());
    }

    println!("{}", "Athena Configuration".cyan().bold());
    println!("{}", "═".repeat(50).dimmed());
    println!();
    println!("  {}", "Endpoints".yellow().bold());
    println!("    {:<16} {}", "API:", endpoints.api);
    println!("    {:<16} {}", "Agents:", endpoints.creator);
    println!("    {:<16} {}", "Training:", endpoints.train);
    println!("    {:<16} {}", "Chat:", endpoints.chat);
    println!();
    println!("  {}", "HTTP".yellow().bold());
    println!("    {:<16} {}s", "Timeout:", config.http.timeout_secs);
    println!("    {:<16} {}s", "Connect timeout:", config.http.connect_timeout_secs);
    println!();
    println!("  {}", "Session".yellow().bold());
    println!("    {:<16} {}", "Path:", ctx.session_path.display());
    let signed_in = if ctx.session.is_authenticated() {
        "yes".green()
    } else {
        "no".dimmed()
    };
    println!("    {:<16} {}", "Signed in:", signed_in);
    println!();
    println!("  {}", "Logging".yellow().bold());
    println!("    {:<16} {}", "Level:", config.log_level());
    println!("    {:<16} {}", "JSON:", config.logging.json_format);
    Ok(())
}
