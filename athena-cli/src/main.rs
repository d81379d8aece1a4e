use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use athena_core::{AthenaConfig, AthenaError, CliErrorDisplay, LoggingConfig};

mod commands;
mod config;
mod output;

use commands::{
    cmd_dashboard, cmd_login, cmd_logout, cmd_test_connection, cmd_train, cmd_whoami,
    handle_agents_command, handle_chat_command, handle_config_command, AgentsCommand,
    ChatCommand, ConfigCommand,
};
use config::CliContext;
use output::OutputFormat;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Parser)]
#[command(name = "athena")]
#[command(version = VERSION)]
#[command(about = "Athena - sign in, build, train and chat with educational AI agents")]
#[command(long_about = r#"
Athena connects students, instructors and administrators to hosted AI agents.

Use 'athena login --user-id <id>' to sign in, then 'athena dashboard' to open
the view for your role. Instructors manage agents with 'athena agents' and
upload training documents with 'athena train'. Everyone can chat with
'athena chat'.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,

    #[arg(
        short,
        long,
        global = true,
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Sign in and remember the session")]
    Login {
        #[arg(short, long, env = "ATHENA_USER_ID")]
        user_id: String,

        #[arg(short, long, env = "ATHENA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    #[command(about = "Sign out and forget the session")]
    Logout,

    #[command(about = "Show the signed-in user")]
    Whoami,

    #[command(about = "Open the landing view for your role")]
    Dashboard,

    #[command(about = "Manage your agents (instructors)")]
    Agents {
        #[command(subcommand)]
        action: Option<AgentsCommand>,
    },

    #[command(about = "Upload a PDF to train an agent (instructors)")]
    Train {
        #[arg(help = "Agent id")]
        agent_id: String,

        #[arg(help = "PDF document, at most 10 MB")]
        file: PathBuf,
    },

    #[command(about = "Chat with an agent")]
    Chat {
        #[command(subcommand)]
        action: Option<ChatCommand>,
    },

    #[command(about = "Check that the main API is reachable")]
    TestConnection,

    #[command(about = "Show configuration")]
    Config {
        #[command(subcommand)]
        action: Option<ConfigCommand>,
    },

    #[command(about = "Show version information")]
    Version {
        #[arg(short, long)]
        detailed: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<AthenaError>() {
                Some(err) => {
                    tracing::debug!(code = err.error_code(), "Command failed: {:?}", err);
                    eprint!("{}: {}", "Error".red().bold(), CliErrorDisplay::new(err));
                }
                None => eprintln!("{}: {:#}", "Error".red().bold(), e),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, logging: &LoggingConfig) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
    };

    let layer = if logging.json_format {
        fmt::layer()
            .json()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry().with(layer).with(filter).init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Version { detailed } = cli.command {
        return cmd_version(detailed);
    }

    let config = AthenaConfig::load()?;
    init_logging(cli.verbose, &config.logging);
    let mut ctx = CliContext::load(config, cli.format).await?;

    match cli.command {
        Commands::Login { user_id, password } => cmd_login(&mut ctx, &user_id, password).await,
        Commands::Logout => cmd_logout(&mut ctx).await,
        Commands::Whoami => cmd_whoami(&ctx).await,
        Commands::Dashboard => cmd_dashboard(&mut ctx).await,
        Commands::Agents { action } => handle_agents_command(&mut ctx, action).await,
        Commands::Train { agent_id, file } => cmd_train(&ctx, &agent_id, &file).await,
        Commands::Chat { action } => handle_chat_command(&ctx, action).await,
        Commands::TestConnection => cmd_test_connection(&ctx).await,
        Commands::Config { action } => handle_config_command(&ctx, action).await,
        Commands::Version { detailed } => cmd_version(detailed),
    }
}

fn cmd_version(detailed: bool) -> anyhow::Result<()> {
    if detailed {
        println!("{}", "Athena Version Information".cyan().bold());
        println!("{}", "═".repeat(40).dimmed());
        println!("  {:<15} {}", "Version:".bold(), VERSION);
        println!("  {:<15} {}", "Name:".bold(), NAME);
        println!("  {:<15} Apache-2.0", "License:".bold());
        println!();
        println!("  {}", "Roles:".bold());
        println!("    ◎ Student       chat with agents");
        println!("    ◈ Instructor    create, train and manage agents");
        println!("    ◇ Admin         configuration");
        println!();
        println!("  {}", "Build Information:".bold());
        println!("    Rust Edition: 2021");
        #[cfg(debug_assertions)]
        println!("    Build:        Debug");
        #[cfg(not(debug_assertions))]
        println!("    Build:        Release");
    } else {
        println!("athena {}", VERSION);
    }

    Ok(())
}
