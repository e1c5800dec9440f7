use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use market_application::{COMING_SOON_MESSAGE, LifecycleController, ToolRegistry, ToolView};
use market_core::generation::{GenerationOutput, GenerationService};
use market_core::invocation::{CredentialStatus, PollPolicy};
use market_core::secret::SecretService;
use market_execution::{InvocationEvent, RunOptions, RunReport, ToolRunner, open_external};
use market_infrastructure::{OutputWriter, SecretServiceImpl, SystemClipboard, load_input_file};
use market_interaction::GeminiApiClient;
use tokio::sync::mpsc::UnboundedReceiver;

use super::render::render_text;
use super::utils::{NoCredentialService, load_config, parse_assignment};
use crate::RunArgs;

pub async fn run(
    home: Option<&Path>,
    args: RunArgs,
    events: Option<UnboundedReceiver<InvocationEvent>>,
) -> Result<()> {
    let (config_service, config) = load_config(home)?;

    let secrets = SecretServiceImpl::new(home)?;
    let (service, credential): (Arc<dyn GenerationService>, CredentialStatus) =
        match secrets.gemini_credential().await? {
            Some(key) => (Arc::new(GeminiApiClient::new(key)), CredentialStatus::Selected),
            None => (Arc::new(NoCredentialService), CredentialStatus::Missing),
        };

    let mut registry = ToolRegistry::builtin(&config, service)?.with_credential(credential);
    if args.unbounded_polling {
        let interval = Duration::from_secs(config.polling.interval_secs);
        registry = registry.with_poll_policy(PollPolicy::unbounded(interval));
    }

    let controller = match registry.open(&args.key)? {
        ToolView::Form(controller) => controller,
        ToolView::Redirect { descriptor, url } => {
            println!("{} abre em {}", descriptor.title.bold(), url.underline());
            return Ok(open_external(&url)?);
        }
        ToolView::ComingSoon { descriptor } => {
            println!("{}", descriptor.title.bold());
            println!("{}", COMING_SOON_MESSAGE.dimmed());
            return Ok(());
        }
    };

    fill_form(&controller, &args).await?;

    let output_dir = match &args.output {
        Some(directory) => directory.clone(),
        None => config_service.output_dir()?,
    };
    let mut runner = ToolRunner::new(OutputWriter::new(output_dir));
    if args.copy {
        runner = runner.with_clipboard(Arc::new(SystemClipboard));
    }
    let options = RunOptions {
        copy: args.copy,
        ..RunOptions::default()
    };

    let printer = events.map(|events| tokio::spawn(print_events(events)));
    let report = runner
        .run(&controller, &options, |message| eprintln!("{}", message.cyan()))
        .await;
    if let Some(printer) = printer {
        printer.abort();
    }
    controller.close()?;

    print_report(&report?, args.html)
}

async fn fill_form(controller: &LifecycleController, args: &RunArgs) -> Result<()> {
    for raw in &args.fields {
        let (name, value) = parse_assignment(raw)?;
        controller
            .set_field(name, value)
            .with_context(|| format!("Cannot set field '{name}'"))?;
    }

    for raw in &args.files {
        let (name, path) = parse_assignment(raw)?;
        let file = load_input_file(Path::new(path)).await?;
        controller
            .set_field(name, file)
            .with_context(|| format!("Cannot use {path} for '{name}'"))?;
    }

    for raw in &args.drops {
        let (name, path) = parse_assignment(raw)?;
        let file = load_input_file(Path::new(path)).await?;
        if !controller.drop_file(name, file)? {
            eprintln!("{} {} não é uma imagem; ignorado.", "!".yellow(), path);
        }
    }
    Ok(())
}

/// Short status lines for controller events when plain logging is off.
async fn print_events(mut events: UnboundedReceiver<InvocationEvent>) {
    while let Some(event) = events.recv().await {
        if event.level == "WARN" || event.level == "ERROR" {
            continue;
        }
        let Some(phase) = event.phase() else {
            continue;
        };
        let line = match event.attempt() {
            Some(attempt) => format!("[{phase} #{attempt}] {}", event.message),
            None => format!("[{phase}] {}", event.message),
        };
        eprintln!("{}", line.dimmed());
    }
}

fn print_report(report: &RunReport, html: bool) -> Result<()> {
    if !report.succeeded() {
        let message = report
            .error
            .as_deref()
            .unwrap_or("A ferramenta não retornou um resultado.");
        anyhow::bail!("{message}");
    }

    match &report.output {
        Some(GenerationOutput::Text(text)) => println!("{}", render_text(text, html, false)),
        Some(GenerationOutput::Fields(fields)) => {
            for (name, value) in fields {
                println!("{:<16} {}", format!("{name}:").cyan(), value);
            }
        }
        Some(GenerationOutput::Image(_)) | Some(GenerationOutput::Video(_)) | None => {}
    }

    if let Some(path) = &report.saved_to {
        println!("{} {}", "Salvo em".green(), path.display());
    }
    if report.copied {
        println!("{}", "Copiado!".green());
    }
    Ok(())
}
