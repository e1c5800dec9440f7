use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use colored::Colorize;
use market_application::COMING_SOON_MESSAGE;
use market_core::invocation::FieldKind;
use market_core::tool::{ToolCategory, ToolDescriptor, ToolLaunch};
use serde_json::json;

use super::utils::{catalog, handlers, load_config};

pub fn list(home: Option<&Path>, category: Option<&str>, as_json: bool) -> Result<()> {
    let (_, config) = load_config(home)?;
    let catalog = catalog(&config)?;
    let handlers = handlers(&config)?;

    let category = category
        .map(|name| {
            ToolCategory::from_str(name).with_context(|| format!("Unknown category '{name}'"))
        })
        .transpose()?;

    if as_json {
        let tools: Vec<_> = catalog
            .all()
            .iter()
            .filter(|tool| category.is_none_or(|c| tool.category == c))
            .map(|tool| {
                json!({
                    "tool": tool,
                    "implemented": handlers.contains_key(tool.key.as_str()),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&tools)?);
        return Ok(());
    }

    for (group, tools) in catalog.grouped() {
        if category.is_some_and(|c| c != group) {
            continue;
        }
        println!("{}", group.to_string().bold().underline());
        for tool in tools {
            let status = match &tool.launch {
                ToolLaunch::Redirect { .. } => "externo".yellow(),
                ToolLaunch::Inline if handlers.contains_key(tool.key.as_str()) => {
                    "disponível".green()
                }
                ToolLaunch::Inline => "em breve".dimmed(),
            };
            println!("  {:<30} {} [{}]", tool.key.cyan(), tool.title, status);
        }
        println!();
    }
    Ok(())
}

pub fn show(home: Option<&Path>, key: &str) -> Result<()> {
    let (_, config) = load_config(home)?;
    let catalog = catalog(&config)?;
    let handlers = handlers(&config)?;
    let tool = catalog
        .get(key)
        .with_context(|| format!("Unknown tool '{key}'. Run `market-suite tools` to list them."))?;

    print_header(tool);

    if let Some(url) = tool.redirect_url() {
        println!("{} {}", "Abre em:".bold(), url);
        return Ok(());
    }
    let Some(handler) = handlers.get(key) else {
        println!("{}", COMING_SOON_MESSAGE.dimmed());
        return Ok(());
    };

    println!("{}", "Campos:".bold());
    for field in handler.fields() {
        let required = if field.required { "*".red() } else { " ".normal() };
        println!("  {}{:<18} {}", required, field.name.cyan(), field.label);
        match &field.kind {
            FieldKind::Choice(options) => {
                println!("  {:<19} opções: {}", "", options.join(" | ").dimmed())
            }
            FieldKind::Image => println!("  {:<19} {}", "", "imagem PNG, JPEG ou WEBP".dimmed()),
            _ => {}
        }
        if let Some(placeholder) = &field.placeholder {
            println!("  {:<19} {}", "", placeholder.dimmed());
        }
    }
    if handler.requires_credential() {
        println!();
        println!("{}", "Requer uma chave de API com faturamento habilitado.".yellow());
    }
    Ok(())
}

fn print_header(tool: &ToolDescriptor) {
    println!("{} {}", tool.title.bold(), format!("({})", tool.key).dimmed());
    println!("{}", tool.description);
    println!("{} {}", "Categoria:".bold(), tool.category);
    println!();
}
