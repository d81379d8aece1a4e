use colored::Colorize;
use serde_json::json;
use std::path::Path;

use athena_core::{format_file_size, guard, AgentId, AthenaError, Route, TrainingDocument};

use crate::config::CliContext;
use crate::output::print_structured;

/// Upload one PDF to train an agent.
///
/// The document is checked locally before anything is fetched. `agent_id`
/// may name either of an agent's ids; the upload always targets its training
/// id.
pub async fn cmd_train(ctx: &CliContext, agent_id: &str, file: &Path) -> anyhow::Result<()> {
    let user = ctx.user()?;
    guard(
        &ctx.session,
        Route::Train {
            agent_id: Some(AgentId::new(agent_id)),
        },
    )?;

    let document = TrainingDocument::from_path(file).await?;

    let mut catalog = ctx.client.catalog(&user.user_id);
    catalog.refresh().await?;
    let agent = catalog
        .get(agent_id)
        .ok_or_else(|| AthenaError::AgentNotFound(agent_id.to_string()))?;
    let target = agent.training_id().clone();

    if !ctx.format.is_structured() {
        println!(
            "{} {} ({}) to {}",
            "Uploading".cyan(),
            document.file_name().bold(),
            format_file_size(document.size()),
            agent.display_name()
        );
    }

    let receipt = ctx.client.training().upload(&document, &target).await?;

    if print_structured(
        ctx.format,
        &json!({
            "agent_id": target,
            "file": document.file_name(),
            "size": document.size(),
            "receipt": receipt,
        }),
    )? {
        return Ok(());
    }

    println!(
        "{} {}",
        "✓".green().bold(),
        receipt
            .message
            .as_deref()
            .unwrap_or("Document uploaded successfully!")
            .green()
    );
    if let Some(document_id) = &receipt.document_id {
        println!("  {:<12} {}", "Document:".bold(), document_id);
    }
    if let Some(pages) = receipt.pages {
        println!("  {:<12} {}", "Pages:".bold(), pages);
    }
    if let Some(words) = receipt.word_count {
        println!("  {:<12} {}", "Words:".bold(), words);
    }
    Ok(())
}
