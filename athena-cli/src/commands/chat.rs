use clap::Subcommand;
use colored::Colorize;
use comfy_table::{Cell, Color};
use serde_json::json;

use athena_core::{ChatMessage, ChatSession, SendOutcome, STARTER_PROMPTS};

use super::prompt_line;
use crate::config::CliContext;
use crate::output::{new_table, print_structured, truncate};

#[derive(Subcommand)]
pub enum ChatCommand {
    #[command(about = "List agents available for chat")]
    List,

    #[command(about = "Open an interactive chat with an agent")]
    Open {
        #[arg(help = "Chat agent id")]
        agent_id: String,
    },

    #[command(about = "Send a single message and print the reply")]
    Send {
        #[arg(help = "Chat agent id")]
        agent_id: String,

        #[arg(help = "Message text")]
        message: String,
    },

    #[command(about = "Print the stored conversation with an agent")]
    History {
        #[arg(help = "Chat agent id")]
        agent_id: String,
    },
}

pub async fn handle_chat_command(
    ctx: &CliContext,
    cmd: Option<ChatCommand>,
) -> anyhow::Result<()> {
    match cmd.unwrap_or(ChatCommand::List) {
        ChatCommand::List => print_chat_agents(ctx).await,
        ChatCommand::Open { agent_id } => cmd_chat_open(ctx, &agent_id).await,
        ChatCommand::Send { agent_id, message } => cmd_chat_send(ctx, &agent_id, &message).await,
        ChatCommand::History { agent_id } => cmd_chat_history(ctx, &agent_id).await,
    }
}

pub(crate) async fn print_chat_agents(ctx: &CliContext) -> anyhow::Result<()> {
    ctx.user()?;
    let agents = ctx.client.chat().list_agents().await?;

    if ctx.format.is_structured() {
        let rows: Vec<_> = agents
            .iter()
            .map(|a| json!({"agent": a, "unlocked": ctx.session.is_paid(&a.agent_id)}))
            .collect();
        print_structured(ctx.format, &rows)?;
        return Ok(());
    }

    if agents.is_empty() {
        println!("{}", "No agents available yet.".yellow());
        return Ok(());
    }

    println!("{}", "Available Agents".cyan().bold());
    println!();

    let mut table = new_table(&["Agent ID", "Name", "Model", "Description", "Access"]);
    for agent in &agents {
        let access = if ctx.session.is_paid(&agent.agent_id) {
            Cell::new("unlocked").fg(Color::Green)
        } else {
            Cell::new("-").fg(Color::DarkGrey)
        };
        table.add_row(vec![
            Cell::new(&agent.agent_id),
            Cell::new(agent.display_name()),
            Cell::new(agent.model_label()),
            Cell::new(truncate(agent.description.as_deref().unwrap_or(""), 40)),
            access,
        ]);
    }

    println!("{table}");
    println!();
    println!(
        "{}",
        "Run 'athena chat open <agent-id>' to start chatting.".dimmed()
    );
    Ok(())
}

async fn cmd_chat_open(ctx: &CliContext, agent_id: &str) -> anyhow::Result<()> {
    let user = ctx.user()?;
    let session = ctx.client.chat().open(&user.user_id, agent_id).await?;
    let agent = session.agent();

    println!(
        "{} {}",
        agent.display_name().cyan().bold(),
        format!("({})", agent.model_label()).dimmed()
    );
    if let Some(description) = &agent.description {
        println!("{}", description.dimmed());
    }
    println!("{}", "═".repeat(50).dimmed());

    let transcript = session.transcript().await;
    if transcript.is_empty() {
        println!("{}", "Start a conversation. Try one of these:".yellow());
        for (i, prompt) in STARTER_PROMPTS.iter().enumerate() {
            println!("  {} {}", format!("/{}", i + 1).bold(), prompt);
        }
    } else {
        for message in &transcript {
            print_message(message, agent.display_name());
        }
    }
    println!(
        "{}",
        "Commands: /reset clears the chat, /history reloads it, /quit exits.".dimmed()
    );

    loop {
        let line = prompt_line(&format!("{} ", "you>".green().bold()))?;
        let input = line.trim();

        match input {
            "" => continue,
            "/quit" | "/exit" => break,
            "/reset" => {
                session.reset().await?;
                println!("{}", "Chat cleared.".yellow());
                continue;
            }
            "/history" => {
                match session.reload_history().await {
                    Ok(count) => {
                        println!("{}", format!("Loaded {} messages.", count).dimmed());
                        for message in session.transcript().await {
                            print_message(&message, agent.display_name());
                        }
                    }
                    Err(e) => eprintln!("{} {}", "✗".red(), e),
                }
                continue;
            }
            _ => {}
        }

        let text = starter_prompt(input).unwrap_or(input);
        send_and_print(&session, text).await?;
    }

    session.close().await;
    println!("{}", "Goodbye.".dimmed());
    Ok(())
}

fn starter_prompt(input: &str) -> Option<&'static str> {
    let index: usize = input.strip_prefix('/')?.parse().ok()?;
    STARTER_PROMPTS.get(index.checked_sub(1)?).copied()
}

async fn send_and_print(session: &ChatSession, text: &str) -> anyhow::Result<()> {
    match session.send(text).await? {
        SendOutcome::Replied(reply) => print_message(&reply, session.agent().display_name()),
        SendOutcome::Failed { error } => {
            eprintln!("{} {}", "✗".red(), error);
            print_message(&ChatMessage::error(), session.agent().display_name());
        }
        SendOutcome::Discarded => {}
    }
    Ok(())
}

async fn cmd_chat_send(ctx: &CliContext, agent_id: &str, message: &str) -> anyhow::Result<()> {
    let user = ctx.user()?;
    let reply = ctx
        .client
        .chat()
        .send_turn(&user.user_id, agent_id, message)
        .await?;

    if print_structured(ctx.format, &reply)? {
        return Ok(());
    }
    println!("{}", reply.text);
    Ok(())
}

async fn cmd_chat_history(ctx: &CliContext, agent_id: &str) -> anyhow::Result<()> {
    let user = ctx.user()?;
    let messages = ctx.client.chat().history(&user.user_id, agent_id).await?;

    if print_structured(ctx.format, &messages)? {
        return Ok(());
    }
    if messages.is_empty() {
        println!("{}", "No messages yet.".yellow());
        return Ok(());
    }
    for message in &messages {
        print_message(message, agent_id);
    }
    Ok(())
}

fn print_message(message: &ChatMessage, agent_name: &str) {
    let time = message.timestamp.format("%H:%M").to_string().dimmed();
    if message.is_user {
        println!("{} {} {}", time, "you:".green().bold(), message.text);
    } else if message.is_error {
        println!("{} {} {}", time, format!("{}:", agent_name).red().bold(), message.text.red());
    } else {
        println!("{} {} {}", time, format!("{}:", agent_name).blue().bold(), message.text);
    }
}
