use colored::Colorize;
use serde_json::json;

use athena_core::{guard, Role, Route};

use super::prompt_line;
use crate::config::CliContext;
use crate::output::print_structured;

pub async fn cmd_login(
    ctx: &mut CliContext,
    user_id: &str,
    password: Option<String>,
) -> anyhow::Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt_line("Password: ")?,
    };

    let route = ctx
        .client
        .auth()
        .login(&mut ctx.session, user_id, &password)
        .await?;
    let user = ctx.user()?;

    if print_structured(ctx.format, &json!({"user": user, "route": route.path()}))? {
        return Ok(());
    }

    println!(
        "{} Signed in as {} ({})",
        "✓".green().bold(),
        user.display_name().bold(),
        user.role
    );
    println!("  {} Dashboard: {}", "→".blue(), route.path());
    println!("{}", "Run 'athena dashboard' to open it.".dimmed());
    Ok(())
}

pub async fn cmd_logout(ctx: &mut CliContext) -> anyhow::Result<()> {
    let was_signed_in = ctx.session.is_authenticated();
    ctx.client.auth().logout(&mut ctx.session).await?;

    if was_signed_in {
        println!("{} Signed out", "✓".green().bold());
    } else {
        println!("{}", "No active session.".yellow());
    }
    Ok(())
}

pub async fn cmd_whoami(ctx: &CliContext) -> anyhow::Result<()> {
    let user = ctx.user()?;
    let landing = Route::landing(user.role);

    if print_structured(ctx.format, &json!({"user": user, "landing": landing.path()}))? {
        return Ok(());
    }

    println!("{}", "Current User".cyan().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!("  {:<12} {}", "User ID:".bold(), user.user_id);
    println!("  {:<12} {}", "Name:".bold(), user.display_name());
    println!("  {:<12} {}", "Role:".bold(), user.role);
    if let Some(campus) = &user.campus {
        println!("  {:<12} {}", "Campus:".bold(), campus);
    }
    println!("  {:<12} {}", "Dashboard:".bold(), landing.path());

    let paid: Vec<&str> = ctx.session.paid_agents().collect();
    if !paid.is_empty() {
        println!("  {:<12} {}", "Unlocked:".bold(), paid.join(", "));
    }
    Ok(())
}

/// Open the landing view for the signed-in role.
pub async fn cmd_dashboard(ctx: &mut CliContext) -> anyhow::Result<()> {
    let user = ctx.user()?;
    let route = guard(&ctx.session, Route::landing(user.role))?;

    if !ctx.format.is_structured() {
        println!(
            "{} {} {}",
            "Welcome back,".cyan().bold(),
            user.display_name().cyan().bold(),
            format!("({})", route.path()).dimmed()
        );
        println!();
    }

    match user.role {
        Role::Student => super::chat::print_chat_agents(ctx).await,
        Role::Instructor => super::agents::print_agent_list(ctx, &user.user_id).await,
        Role::Admin => super::config::print_config(ctx),
    }
}
