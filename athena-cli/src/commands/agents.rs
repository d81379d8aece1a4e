use clap::{Args, Subcommand};
use colored::Colorize;
use comfy_table::{Cell, Color};
use serde_json::json;

use athena_core::{
    guard, Agent, AgentDraft, AgentForm, AgentKind, AthenaError, Formality, Route, Tone,
    Visibility,
};

use super::confirm;
use crate::config::CliContext;
use crate::output::{new_table, print_structured, truncate};

#[derive(Subcommand)]
pub enum AgentsCommand {
    #[command(about = "List your agents")]
    List,

    #[command(about = "Show one agent in detail")]
    Show {
        #[arg(help = "Agent id")]
        id: String,
    },

    #[command(about = "Create a new agent")]
    Create {
        #[command(flatten)]
        fields: AgentFields,
    },

    #[command(about = "Update an existing agent")]
    Update {
        #[arg(help = "Agent id")]
        id: String,

        #[command(flatten)]
        fields: AgentFields,

        #[arg(long, help = "Remove a course (repeatable)")]
        remove_course: Vec<String>,
    },

    #[command(about = "Delete an agent")]
    Delete {
        #[arg(help = "Agent id")]
        id: String,

        #[arg(short, long, help = "Skip the confirmation prompt")]
        yes: bool,
    },

    #[command(about = "Save your voice selection")]
    Voice {
        #[arg(help = "Built-in voice id")]
        voice_id: String,
    },

    #[command(about = "List unlocked agents, or unlock one")]
    Paid {
        #[arg(help = "Agent id to mark as unlocked")]
        id: Option<String>,
    },
}

#[derive(Args, Debug, Default)]
pub struct AgentFields {
    #[arg(short = 't', long, help = "instructor, it_support or administration")]
    pub agent_type: Option<AgentKind>,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(short, long, help = "Domain or subject, e.g. Computer Science")]
    pub domain: Option<String>,

    #[arg(short, long, help = "Campus, e.g. Main Campus")]
    pub campus: Option<String>,

    #[arg(short, long)]
    pub region: Option<String>,

    #[arg(long = "course", help = "Add a course (repeatable)")]
    pub courses: Vec<String>,

    #[arg(long, help = "friendly, professional, enthusiastic, supportive or strict")]
    pub tone: Option<Tone>,

    #[arg(long, help = "casual, professional or formal")]
    pub formality: Option<Formality>,

    #[arg(short, long)]
    pub model: Option<String>,

    #[arg(long, help = "Sampling temperature between 0.0 and 2.0")]
    pub temperature: Option<f32>,

    #[arg(long, help = "private, campus or public")]
    pub visibility: Option<Visibility>,
}

impl AgentFields {
    fn apply(self, draft: &mut AgentDraft) {
        if let Some(kind) = self.agent_type {
            draft.agent_type = kind;
        }
        if let Some(name) = self.name {
            draft.name = Some(name);
        }
        if let Some(description) = self.description {
            draft.description = Some(description);
        }
        if let Some(domain) = self.domain {
            draft.domain = domain;
        }
        if let Some(campus) = self.campus {
            draft.campus = campus;
        }
        if let Some(region) = self.region {
            draft.region = region;
        }
        for course in &self.courses {
            draft.add_course(course);
        }
        if let Some(tone) = self.tone {
            draft.personality.tone = tone;
        }
        if let Some(formality) = self.formality {
            draft.personality.formality = formality;
        }
        if let Some(model) = self.model {
            draft.model_type = Some(model);
        }
        if let Some(temperature) = self.temperature {
            draft.temperature = Some(temperature);
        }
        if let Some(visibility) = self.visibility {
            draft.visibility = visibility;
        }
    }
}

pub async fn handle_agents_command(
    ctx: &mut CliContext,
    cmd: Option<AgentsCommand>,
) -> anyhow::Result<()> {
    let user = ctx.user()?;
    let cmd = cmd.unwrap_or(AgentsCommand::List);
    if !matches!(cmd, AgentsCommand::Paid { .. }) {
        guard(&ctx.session, Route::Creator)?;
    }

    match cmd {
        AgentsCommand::List => print_agent_list(ctx, &user.user_id).await,
        AgentsCommand::Show { id } => cmd_agents_show(ctx, &user.user_id, &id).await,
        AgentsCommand::Create { fields } => cmd_agents_create(ctx, &user.user_id, fields).await,
        AgentsCommand::Update {
            id,
            fields,
            remove_course,
        } => cmd_agents_update(ctx, &user.user_id, &id, fields, &remove_course).await,
        AgentsCommand::Delete { id, yes } => cmd_agents_delete(ctx, &user.user_id, &id, yes).await,
        AgentsCommand::Voice { voice_id } => cmd_agents_voice(ctx, &user.user_id, &voice_id).await,
        AgentsCommand::Paid { id } => cmd_agents_paid(ctx, id).await,
    }
}

pub(crate) async fn print_agent_list(ctx: &CliContext, creator_id: &str) -> anyhow::Result<()> {
    let mut catalog = ctx.client.catalog(creator_id);
    if let Err(e) = catalog.refresh().await {
        println!("{}", "Run the command again to retry.".dimmed());
        return Err(e.into());
    }

    if print_structured(ctx.format, catalog.agents())? {
        return Ok(());
    }

    if catalog.agents().is_empty() {
        println!("{}", "No agents yet.".yellow());
        println!(
            "{}",
            "Run 'athena agents create --domain <subject> --campus <campus>' to add one.".dimmed()
        );
        return Ok(());
    }

    println!("{}", "Your Agents".cyan().bold());
    println!();

    let mut table = new_table(&[
        "ID",
        "Type",
        "Domain",
        "Campus",
        "Courses",
        "Personality",
        "Visibility",
    ]);
    for agent in catalog.agents() {
        let (shown, hidden) = agent.course_preview();
        let mut courses = shown.join(", ");
        if hidden > 0 {
            courses.push_str(&format!(" +{} more", hidden));
        }

        table.add_row(vec![
            Cell::new(agent.id.as_str()),
            Cell::new(agent.agent_type.label()),
            Cell::new(truncate(agent.display_name(), 28)),
            Cell::new(&agent.campus),
            Cell::new(courses),
            Cell::new(format!(
                "{} / {}",
                agent.personality.tone, agent.personality.formality
            )),
            visibility_cell(agent.visibility),
        ]);
    }

    println!("{table}");
    println!();
    println!("  Total: {} agents", catalog.agents().len());
    Ok(())
}

fn visibility_cell(visibility: Visibility) -> Cell {
    let color = match visibility {
        Visibility::Private => Color::DarkGrey,
        Visibility::Campus => Color::Yellow,
        Visibility::Public => Color::Green,
    };
    Cell::new(visibility.label()).fg(color)
}

async fn load_agent(ctx: &CliContext, creator_id: &str, id: &str) -> anyhow::Result<Agent> {
    let mut catalog = ctx.client.catalog(creator_id);
    catalog.refresh().await?;
    catalog
        .get(id)
        .cloned()
        .ok_or_else(|| AthenaError::AgentNotFound(id.to_string()).into())
}

async fn cmd_agents_show(ctx: &CliContext, creator_id: &str, id: &str) -> anyhow::Result<()> {
    let agent = load_agent(ctx, creator_id, id).await?;

    if print_structured(ctx.format, &agent)? {
        return Ok(());
    }

    println!("{}", "Agent Details".cyan().bold());
    println!("{}", "═".repeat(50).dimmed());
    println!();
    println!("  {:<14} {}", "ID:".bold(), agent.id);
    if let Some(training_id) = &agent.agent_id {
        println!("  {:<14} {}", "Agent ID:".bold(), training_id);
    }
    println!("  {:<14} {}", "Name:".bold(), agent.display_name());
    println!("  {:<14} {}", "Type:".bold(), agent.agent_type.label());
    println!("  {:<14} {}", "Domain:".bold(), agent.domain);
    println!("  {:<14} {}", "Campus:".bold(), agent.campus);
    println!(
        "  {:<14} {}",
        "Region:".bold(),
        agent.region.as_deref().unwrap_or("-")
    );
    if let Some(description) = &agent.description {
        println!("  {:<14} {}", "Description:".bold(), description);
    }
    println!();
    println!("  {}", "Personality".yellow().bold());
    println!("    Tone:        {}", agent.personality.tone);
    println!("    Formality:   {}", agent.personality.formality);
    println!();
    println!("  {}", "Model".yellow().bold());
    println!(
        "    Model:       {}",
        agent.model_type.as_deref().unwrap_or("-")
    );
    println!(
        "    Temperature: {}",
        agent
            .temperature
            .map(|t| format!("{:.1}", t))
            .unwrap_or_else(|| "-".to_string())
    );
    println!("    Visibility:  {}", agent.visibility.label());

    if !agent.courses.is_empty() {
        println!();
        println!("  {}", "Courses".yellow().bold());
        for course in &agent.courses {
            println!("    • {}", course);
        }
    }

    if let Some(created) = agent.created_at {
        println!();
        println!(
            "  {} {}",
            "Created:".dimmed(),
            created.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    Ok(())
}

async fn cmd_agents_create(
    ctx: &CliContext,
    creator_id: &str,
    fields: AgentFields,
) -> anyhow::Result<()> {
    let mut form = AgentForm::create(creator_id);
    fields.apply(&mut form.draft);
    submit(ctx, creator_id, form).await
}

async fn cmd_agents_update(
    ctx: &CliContext,
    creator_id: &str,
    id: &str,
    fields: AgentFields,
    remove_courses: &[String],
) -> anyhow::Result<()> {
    let agent = load_agent(ctx, creator_id, id).await?;
    let mut form = AgentForm::edit(creator_id, &agent);
    for course in remove_courses {
        form.draft.remove_course(course);
    }
    fields.apply(&mut form.draft);
    submit(ctx, creator_id, form).await
}

async fn submit(ctx: &CliContext, creator_id: &str, form: AgentForm) -> anyhow::Result<()> {
    let mut catalog = ctx.client.catalog(creator_id);
    let saved = catalog.save(&form).await?;

    if print_structured(ctx.format, &json!({"saved": saved, "agents": catalog.agents()}))? {
        return Ok(());
    }

    println!("{} {}", "✓".green().bold(), form.success_message().green());
    if let Some(agent) = saved {
        println!("  {} {} ({})", "→".blue(), agent.display_name(), agent.id);
    }
    println!("  Total: {} agents", catalog.agents().len());
    Ok(())
}

async fn cmd_agents_delete(
    ctx: &CliContext,
    creator_id: &str,
    id: &str,
    skip_confirm: bool,
) -> anyhow::Result<()> {
    let mut catalog = ctx.client.catalog(creator_id);
    catalog.refresh().await?;

    let deleted = catalog
        .delete(id, |agent| {
            skip_confirm
                || confirm(&format!(
                    "Delete agent '{}' ({})?",
                    agent.display_name(),
                    agent.id
                ))
        })
        .await?;

    if !deleted {
        println!("{}", "Cancelled.".yellow());
        return Ok(());
    }

    println!("{} Deleted agent {}", "✓".green().bold(), id);
    println!("  Remaining: {} agents", catalog.agents().len());
    Ok(())
}

async fn cmd_agents_voice(ctx: &CliContext, user_id: &str, voice_id: &str) -> anyhow::Result<()> {
    ctx.client.agents().clone_voice(user_id, voice_id).await?;
    println!("{} Voice '{}' saved", "✓".green().bold(), voice_id.trim());
    Ok(())
}

async fn cmd_agents_paid(ctx: &mut CliContext, id: Option<String>) -> anyhow::Result<()> {
    if let Some(id) = id {
        if ctx.session.mark_paid(&id).await? {
            println!("{} Agent {} unlocked", "✓".green().bold(), id);
        } else {
            println!("{}", format!("Agent {} is already unlocked.", id).yellow());
        }
        return Ok(());
    }

    let paid: Vec<&str> = ctx.session.paid_agents().collect();
    if print_structured(ctx.format, &paid)? {
        return Ok(());
    }
    if paid.is_empty() {
        println!("{}", "No unlocked agents.".yellow());
    } else {
        println!("{}", "Unlocked Agents".cyan().bold());
        for id in paid {
            println!("  • {}", id);
        }
    }
    Ok(())
}
