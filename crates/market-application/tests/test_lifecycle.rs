//! Lifecycle behavior against a scripted generation service.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use market_application::controller::CREDENTIAL_REQUIRED_MESSAGE;
use market_application::{LifecycleController, ToolRegistry, ToolView};
use market_core::clipboard::Clipboard;
use market_core::config::AppConfig;
use market_core::error::{MarketError, Result};
use market_core::generation::{
    GenerationOperation, GenerationOutput, GenerationRequest, GenerationResponse,
    GenerationService,
};
use market_core::invocation::{CredentialStatus, InputFile, InvocationPhase, PollPolicy};
use tokio::sync::Notify;

/// Lets a test hold `generate` until it decides to release it.
#[derive(Default)]
struct Gate {
    started: Notify,
    release: Notify,
}

#[derive(Default)]
struct FakeService {
    generate_replies: Mutex<VecDeque<Result<GenerationResponse>>>,
    poll_replies: Mutex<VecDeque<Result<GenerationOperation>>>,
    requests: Mutex<Vec<GenerationRequest>>,
    polls: AtomicU32,
    gate: Option<Arc<Gate>>,
}

impl FakeService {
    fn replying(replies: Vec<Result<GenerationResponse>>) -> Self {
        Self {
            generate_replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    fn with_polls(self, replies: Vec<Result<GenerationOperation>>) -> Self {
        *self.poll_replies.lock().unwrap() = replies.into();
        self
    }

    fn gated(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }

    fn generate_calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn poll_calls(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationService for FakeService {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.started.notify_one();
            gate.release.notified().await;
        }
        self.generate_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(MarketError::service(Some(500), "no reply scripted")))
    }

    async fn poll_operation(&self, operation: &GenerationOperation) -> Result<GenerationOperation> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.poll_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(operation.clone()))
    }

    async fn fetch_asset(&self, uri: &str) -> Result<Vec<u8>> {
        Ok(format!("video from {uri}").into_bytes())
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

fn text_reply(text: &str) -> Result<GenerationResponse> {
    Ok(GenerationResponse::Completed(GenerationOutput::Text(
        text.to_string(),
    )))
}

fn open(service: Arc<FakeService>, key: &str, policy: PollPolicy) -> LifecycleController {
    let registry = ToolRegistry::builtin(&AppConfig::default(), service)
        .unwrap()
        .with_poll_policy(policy)
        .with_credential(CredentialStatus::Selected);
    match registry.open(key).unwrap() {
        ToolView::Form(controller) => controller,
        other => panic!("expected a form, got {other:?}"),
    }
}

fn png() -> InputFile {
    InputFile::new("tenis.png", "image/png", vec![0x89, 0x50, 0x4e, 0x47])
}

fn fill_notification(controller: &LifecycleController) {
    controller.set_field("customerName", "João").unwrap();
    controller.set_field("productName", "Tênis").unwrap();
    controller.set_field("value", "199,90").unwrap();
}

#[tokio::test]
async fn test_notification_issues_exactly_one_request() {
    let service = Arc::new(FakeService::replying(vec![text_reply(
        "Olá João! Sua compra do *Tênis* foi aprovada.",
    )]));
    let controller = open(service.clone(), "notification-generator", PollPolicy::default());
    fill_notification(&controller);

    let phase = controller.submit().await.unwrap();

    assert_eq!(phase, InvocationPhase::Succeeded);
    assert_eq!(service.generate_calls(), 1);
    let prompt = service.requests.lock().unwrap()[0].prompt.clone();
    assert!(prompt.contains("João"));
    assert!(prompt.contains("Tênis"));
    assert!(prompt.contains("199,90"));
    assert!(prompt.contains("Venda Aprovada"));
    assert!(prompt.contains("Profissional"));

    let state = controller.snapshot().unwrap();
    assert!(state.error_message().is_none());
    assert!(state.can_copy());
}

#[tokio::test]
async fn test_missing_required_field_makes_no_request() {
    let service = Arc::new(FakeService::default());
    let controller = open(service.clone(), "notification-generator", PollPolicy::default());
    controller.set_field("customerName", "João").unwrap();
    controller.set_field("value", "199,90").unwrap();

    let phase = controller.submit().await.unwrap();

    assert_eq!(phase, InvocationPhase::Failed);
    assert_eq!(service.generate_calls(), 0);
    let state = controller.snapshot().unwrap();
    assert_eq!(
        state.error_message(),
        Some("Por favor, preencha os campos obrigatórios: Nome do Cliente, Nome do Produto e Valor.")
    );
    assert!(state.result().is_none());
}

#[tokio::test]
async fn test_result_and_error_are_exclusive_across_runs() {
    let service = Arc::new(FakeService::replying(vec![
        Err(MarketError::service(Some(503), "UNAVAILABLE")),
        text_reply("Mensagem pronta"),
    ]));
    let controller = open(service.clone(), "notification-generator", PollPolicy::default());
    fill_notification(&controller);

    assert_eq!(controller.submit().await.unwrap(), InvocationPhase::Failed);
    let state = controller.snapshot().unwrap();
    assert!(state.result().is_none());
    assert_eq!(
        state.error_message(),
        Some("Ocorreu um erro ao gerar a notificação. Verifique o console para mais detalhes.")
    );

    assert_eq!(controller.submit().await.unwrap(), InvocationPhase::Succeeded);
    let state = controller.snapshot().unwrap();
    assert!(state.error_message().is_none());
    assert_eq!(
        state.result().and_then(GenerationOutput::as_text),
        Some("Mensagem pronta")
    );
    assert_eq!(service.generate_calls(), 2);
}

#[tokio::test]
async fn test_submit_while_in_flight_is_rejected() {
    let gate = Arc::new(Gate::default());
    let service = Arc::new(FakeService::replying(vec![text_reply("ok")]).gated(gate.clone()));
    let controller = open(service.clone(), "notification-generator", PollPolicy::default());
    fill_notification(&controller);

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit().await }
    });
    gate.started.notified().await;

    assert_eq!(controller.phase().unwrap(), InvocationPhase::InFlight);
    assert!(!controller.can_submit());
    let second = controller.submit().await;
    assert!(matches!(second, Err(MarketError::Busy(_))));

    gate.release.notify_one();
    assert_eq!(first.await.unwrap().unwrap(), InvocationPhase::Succeeded);
    assert_eq!(service.generate_calls(), 1);
}

#[tokio::test]
async fn test_reset_discards_late_result() {
    let gate = Arc::new(Gate::default());
    let service = Arc::new(FakeService::replying(vec![text_reply("tarde demais")]).gated(gate.clone()));
    let controller = open(service.clone(), "notification-generator", PollPolicy::default());
    fill_notification(&controller);

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit().await }
    });
    gate.started.notified().await;

    controller.reset().unwrap();
    gate.release.notify_one();

    assert!(matches!(pending.await.unwrap(), Err(MarketError::Cancelled)));
    let state = controller.snapshot().unwrap();
    assert_eq!(state.phase(), InvocationPhase::Idle);
    assert!(state.result().is_none());
    assert!(state.error_message().is_none());
    assert_eq!(state.text("customerName"), "João");
}

#[tokio::test]
async fn test_drop_rejects_non_image_files() {
    let service = Arc::new(FakeService::default());
    let controller = open(service, "mockup-3d-generator", PollPolicy::default());

    let pdf = InputFile::new("catalogo.pdf", "application/pdf", vec![1, 2]);
    assert!(!controller.drop_file("image", pdf).unwrap());
    assert!(controller.snapshot().unwrap().file("image").is_none());

    assert!(controller.drop_file("image", png()).unwrap());
    assert_eq!(
        controller.snapshot().unwrap().file("image").map(|f| f.name.as_str()),
        Some("tenis.png")
    );
}

#[tokio::test]
async fn test_picker_rejects_unsupported_image_types() {
    let service = Arc::new(FakeService::default());
    let controller = open(service, "visual-variations-generator", PollPolicy::default());

    let gif = InputFile::new("a.gif", "image/gif", vec![1]);
    let err = controller.set_field("image", gif).unwrap_err();
    assert!(err.is_validation());

    let err = controller.set_field("missing", "x").unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test(start_paused = true)]
async fn test_video_is_polled_until_done() {
    let service = Arc::new(
        FakeService::replying(vec![Ok(GenerationResponse::Pending(
            GenerationOperation::pending("operations/abc"),
        ))])
        .with_polls(vec![
            Ok(GenerationOperation::pending("operations/abc")),
            Ok(GenerationOperation::completed(
                "operations/abc",
                "https://files.example/video.mp4",
            )),
        ]),
    );
    let controller = open(
        service.clone(),
        "mockup-3d-generator",
        PollPolicy::bounded(Duration::from_secs(5), 10),
    );
    controller.set_field("image", png()).unwrap();

    assert_eq!(controller.submit().await.unwrap(), InvocationPhase::Succeeded);
    assert_eq!(service.poll_calls(), 2);

    let download = controller.download().unwrap().unwrap();
    assert_eq!(download.filename, "mockup-3d.mp4");
    assert_eq!(download.asset.mime_type, "video/mp4");
    assert_eq!(
        download.asset.bytes,
        b"video from https://files.example/video.mp4".to_vec()
    );
}

#[tokio::test(start_paused = true)]
async fn test_bounded_polling_fails_after_max_attempts() {
    let service = Arc::new(FakeService::replying(vec![Ok(GenerationResponse::Pending(
        GenerationOperation::pending("operations/slow"),
    ))]));
    let controller = open(
        service.clone(),
        "mockup-3d-generator",
        PollPolicy::bounded(Duration::from_secs(5), 3),
    );
    controller.set_field("image", png()).unwrap();

    assert_eq!(controller.submit().await.unwrap(), InvocationPhase::Failed);
    assert_eq!(service.poll_calls(), 3);
    assert_eq!(
        controller.snapshot().unwrap().error_message(),
        Some("A geração do vídeo não foi concluída após 3 verificações. Tente novamente.")
    );
}

#[tokio::test(start_paused = true)]
async fn test_unbounded_polling_keeps_waiting() {
    let service = Arc::new(FakeService::replying(vec![Ok(GenerationResponse::Pending(
        GenerationOperation::pending("operations/forever"),
    ))]));
    let controller = open(
        service.clone(),
        "mockup-3d-generator",
        PollPolicy::unbounded(Duration::from_secs(5)),
    );
    controller.set_field("image", png()).unwrap();

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit().await }
    });
    tokio::time::sleep(Duration::from_secs(1000)).await;

    match controller.phase().unwrap() {
        InvocationPhase::Polling { attempt } => assert!(attempt > 120),
        other => panic!("expected polling, got {other:?}"),
    }
    assert!(controller.progress_message().is_some());

    controller.reset().unwrap();
    assert!(matches!(pending.await.unwrap(), Err(MarketError::Cancelled)));
}

#[tokio::test(start_paused = true)]
async fn test_lost_operation_asks_for_new_credential() {
    let reselect = "A chave de API selecionada não é mais válida. Por favor, selecione outra chave.";
    let service = Arc::new(
        FakeService::replying(vec![Ok(GenerationResponse::Pending(
            GenerationOperation::pending("operations/gone"),
        ))])
        .with_polls(vec![Err(MarketError::credential(reselect))]),
    );
    let controller = open(service, "mockup-3d-generator", PollPolicy::default());
    controller.set_field("image", png()).unwrap();

    assert_eq!(controller.submit().await.unwrap(), InvocationPhase::Failed);
    let state = controller.snapshot().unwrap();
    assert_eq!(state.error_message(), Some(reselect));
    assert_eq!(state.credential(), CredentialStatus::Invalidated);
    assert!(state.needs_credential());
}

#[tokio::test]
async fn test_unparsable_operation_shows_tool_message() {
    let service = Arc::new(FakeService::replying(vec![Err(MarketError::malformed(
        "Failed to parse Gemini operation: missing field `name`",
    ))]));
    let controller = open(service, "mockup-3d-generator", PollPolicy::default());
    controller.set_field("image", png()).unwrap();

    assert_eq!(controller.submit().await.unwrap(), InvocationPhase::Failed);
    assert_eq!(
        controller.snapshot().unwrap().error_message(),
        Some("Ocorreu um erro ao gerar o vídeo. Verifique o console.")
    );
}

#[tokio::test]
async fn test_video_without_credential_makes_no_request() {
    let service = Arc::new(FakeService::default());
    let registry = ToolRegistry::builtin(&AppConfig::default(), service.clone()).unwrap();
    let ToolView::Form(controller) = registry.open("mockup-3d-generator").unwrap() else {
        panic!("expected a form");
    };
    controller.set_field("image", png()).unwrap();

    assert_eq!(controller.submit().await.unwrap(), InvocationPhase::Failed);
    assert_eq!(service.generate_calls(), 0);
    assert_eq!(
        controller.snapshot().unwrap().error_message(),
        Some(CREDENTIAL_REQUIRED_MESSAGE)
    );

    controller.set_credential(CredentialStatus::Selected).unwrap();
    assert!(!controller.snapshot().unwrap().needs_credential());
}

#[tokio::test]
async fn test_copy_without_result_does_not_touch_clipboard() {
    let service = Arc::new(FakeService::replying(vec![text_reply(
        "# Oferta\n**Frete grátis** hoje",
    )]));
    let controller = open(service, "notification-generator", PollPolicy::default());
    let clipboard = RecordingClipboard::default();

    assert!(!controller.copy_text(&clipboard).unwrap());
    assert!(clipboard.writes.lock().unwrap().is_empty());

    fill_notification(&controller);
    controller.submit().await.unwrap();
    assert!(controller.copy_text(&clipboard).unwrap());
    assert_eq!(
        clipboard.writes.lock().unwrap().as_slice(),
        ["Oferta\nFrete grátis hoje".to_string()]
    );
    assert!(controller.snapshot().unwrap().copied());
}

#[tokio::test]
async fn test_copied_text_has_no_markdown_markers() {
    let responses = [
        ("**Oferta** só hoje **", "Oferta só hoje"),
        ("* Frete grátis\n* Troca fácil", "Frete grátis\nTroca fácil"),
        ("### **aberto\n---\nDesconto de 10*", "aberto\n\nDesconto de 10"),
    ];

    for (response, expected) in responses {
        let service = Arc::new(FakeService::replying(vec![text_reply(response)]));
        let controller = open(service, "notification-generator", PollPolicy::default());
        let clipboard = RecordingClipboard::default();
        fill_notification(&controller);
        controller.submit().await.unwrap();

        assert!(controller.copy_text(&clipboard).unwrap());
        let writes = clipboard.writes.lock().unwrap();
        assert_eq!(writes.as_slice(), [expected.to_string()], "response: {response:?}");
        assert!(!writes[0].contains('*'));
        assert!(writes[0].lines().all(|line| !line.starts_with('#')));
    }
}

#[tokio::test]
async fn test_pix_fill_merges_fields() {
    let service = Arc::new(FakeService::replying(vec![text_reply(
        "```json\n{\"payerName\": \"Maria Souza\", \"receiverName\": \"Loja XYZ\", \"amount\": \"150,00\"}\n```",
    )]));
    let controller = open(service.clone(), "pix-receipt-generator", PollPolicy::default());
    controller.set_field("amount", "150,00").unwrap();

    assert_eq!(controller.submit().await.unwrap(), InvocationPhase::Succeeded);
    let state = controller.snapshot().unwrap();
    assert_eq!(state.text("payerName"), "Maria Souza");
    assert_eq!(state.text("receiverName"), "Loja XYZ");
    assert_eq!(state.text("amount"), "150,00");
    assert!(service.requests.lock().unwrap()[0].schema.is_some());
}

#[tokio::test]
async fn test_marketing_content_image_and_url_are_exclusive() {
    let service = Arc::new(FakeService::default());
    let controller = open(service, "marketing-content-generator", PollPolicy::default());

    controller.set_field("url", "https://loja.example/produto").unwrap();
    controller.set_field("image", png()).unwrap();
    let state = controller.snapshot().unwrap();
    assert!(state.file("image").is_some());
    assert!(!state.has_value("url"));
}
