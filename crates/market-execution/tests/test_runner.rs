use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use market_application::{ToolRegistry, ToolView};
use market_core::clipboard::Clipboard;
use market_core::config::AppConfig;
use market_core::error::{MarketError, Result};
use market_core::generation::{
    GenerationOperation, GenerationOutput, GenerationRequest, GenerationResponse,
    GenerationService, MediaAsset,
};
use market_core::invocation::{CredentialStatus, InputFile, InvocationPhase, PollPolicy};
use market_execution::{RunOptions, ToolRunner};
use market_infrastructure::OutputWriter;
use tempfile::TempDir;

/// Answers every request with a fixed response; operations finish on the
/// second poll.
struct StaticService {
    response: GenerationResponse,
    polls: Mutex<u32>,
}

impl StaticService {
    fn new(response: GenerationResponse) -> Arc<Self> {
        Arc::new(Self {
            response,
            polls: Mutex::new(0),
        })
    }
}

#[async_trait]
impl GenerationService for StaticService {
    async fn generate(&self, _request: &GenerationRequest) -> Result<GenerationResponse> {
        Ok(self.response.clone())
    }

    async fn poll_operation(&self, operation: &GenerationOperation) -> Result<GenerationOperation> {
        let mut polls = self.polls.lock().unwrap();
        *polls += 1;
        if *polls >= 2 {
            Ok(GenerationOperation::completed(&operation.name, "https://files.example/v.mp4"))
        } else {
            Ok(operation.clone())
        }
    }

    async fn fetch_asset(&self, _uri: &str) -> Result<Vec<u8>> {
        Ok(b"mp4-bytes".to_vec())
    }
}

#[derive(Default)]
struct RecordingClipboard {
    writes: Mutex<Vec<String>>,
}

impl Clipboard for RecordingClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

fn open_form(
    service: Arc<StaticService>,
    key: &str,
) -> market_application::LifecycleController {
    let registry = ToolRegistry::builtin(&AppConfig::default(), service)
        .unwrap()
        .with_poll_policy(PollPolicy::bounded(Duration::from_secs(5), 10))
        .with_credential(CredentialStatus::Selected);
    match registry.open(key).unwrap() {
        ToolView::Form(controller) => controller,
        other => panic!("expected a form, got {other:?}"),
    }
}

fn png() -> InputFile {
    InputFile::new("produto.png", "image/png", vec![0x89, 0x50])
}

#[tokio::test]
async fn test_image_result_is_saved_under_fixed_name() {
    let temp_dir = TempDir::new().unwrap();
    let service = StaticService::new(GenerationResponse::Completed(GenerationOutput::Image(
        MediaAsset::new(b"png-bytes".to_vec(), "image/png"),
    )));
    let controller = open_form(service, "background-remover");
    controller.set_field("image", png()).unwrap();

    let runner = ToolRunner::new(OutputWriter::new(temp_dir.path()));
    let report = runner
        .run(&controller, &RunOptions::default(), |_| {})
        .await
        .unwrap();

    assert!(report.succeeded());
    let saved = report.saved_to.expect("Should save the image");
    assert_eq!(saved, temp_dir.path().join("image-sem-fundo.png"));
    assert_eq!(std::fs::read(saved).unwrap(), b"png-bytes");
    assert!(!report.copied);
}

#[tokio::test]
async fn test_text_result_is_copied() {
    let temp_dir = TempDir::new().unwrap();
    let service = StaticService::new(GenerationResponse::Completed(GenerationOutput::Text(
        "**João**, seu *Tênis* foi enviado!".to_string(),
    )));
    let controller = open_form(service, "notification-generator");
    controller.set_field("customerName", "João").unwrap();
    controller.set_field("productName", "Tênis").unwrap();
    controller.set_field("value", "199,90").unwrap();

    let clipboard = Arc::new(RecordingClipboard::default());
    let runner =
        ToolRunner::new(OutputWriter::new(temp_dir.path())).with_clipboard(clipboard.clone());
    let options = RunOptions {
        copy: true,
        ..RunOptions::default()
    };
    let report = runner.run(&controller, &options, |_| {}).await.unwrap();

    assert!(report.succeeded());
    assert!(report.copied);
    assert!(report.saved_to.is_none());
    assert_eq!(
        clipboard.writes.lock().unwrap().as_slice(),
        ["João, seu Tênis foi enviado!".to_string()]
    );
}

#[tokio::test]
async fn test_failed_run_reports_message() {
    let temp_dir = TempDir::new().unwrap();
    let service = StaticService::new(GenerationResponse::Completed(GenerationOutput::Text(
        "unused".to_string(),
    )));
    let controller = open_form(service, "visual-variations-generator");

    let runner = ToolRunner::new(OutputWriter::new(temp_dir.path()));
    let report = runner
        .run(&controller, &RunOptions::default(), |_| {})
        .await
        .unwrap();

    assert_eq!(report.phase, InvocationPhase::Failed);
    assert!(report.error.is_some());
    assert!(report.output.is_none());
}

#[tokio::test]
async fn test_copy_without_clipboard_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let service = StaticService::new(GenerationResponse::Completed(GenerationOutput::Text(
        "x".to_string(),
    )));
    let controller = open_form(service, "notification-generator");
    let runner = ToolRunner::new(OutputWriter::new(temp_dir.path()));

    let err = runner.copy(&controller).unwrap_err();
    assert!(matches!(err, MarketError::Config(_)));
}

#[tokio::test(start_paused = true)]
async fn test_video_progress_messages_are_reported() {
    let temp_dir = TempDir::new().unwrap();
    let service = StaticService::new(GenerationResponse::Pending(GenerationOperation::pending(
        "operations/spin",
    )));
    let controller = open_form(service, "mockup-3d-generator");
    controller.set_field("image", png()).unwrap();

    let runner = ToolRunner::new(OutputWriter::new(temp_dir.path()));
    let mut messages = Vec::new();
    let report = runner
        .run(&controller, &RunOptions::default(), |message| {
            messages.push(message.to_string())
        })
        .await
        .unwrap();

    assert!(report.succeeded());
    assert_eq!(
        report.saved_to,
        Some(temp_dir.path().join("mockup-3d.mp4"))
    );
    assert!(!messages.is_empty());
    assert!(messages.windows(2).all(|pair| pair[0] != pair[1]));
}
