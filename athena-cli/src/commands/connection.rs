use colored::Colorize;

use crate::config::CliContext;
use crate::output::print_structured;

/// Probe the main API and report how many users it returned.
pub async fn cmd_test_connection(ctx: &CliContext) -> anyhow::Result<()> {
    let api = &ctx.client.endpoints().api;
    if !ctx.format.is_structured() {
        println!("{} {}/test/users", "Testing".cyan(), api);
    }

    let report = ctx.client.test_connection().await?;
    if print_structured(ctx.format, &report)? {
        return Ok(());
    }

    if report.success {
        println!("{} {}", "✓".green().bold(), "Connection successful".green());
    } else {
        println!("{} {}", "✗".red().bold(), "Server reported a failure".red());
    }
    if let Some(message) = &report.message {
        println!("  {:<10} {}", "Message:".bold(), message);
    }
    println!("  {:<10} {}", "Users:".bold(), report.user_count());
    if let Some(timestamp) = &report.timestamp {
        println!("  {:<10} {}", "Time:".bold(), timestamp);
    }
    Ok(())
}
