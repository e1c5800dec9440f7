//! GeminiApiClient - Direct REST API implementation of the generation service.
//!
//! Text, structured and image requests go through `generateContent`; video
//! requests start a long-running `predictLongRunning` operation that is then
//! polled by name. The credential is loaded from secret.json (or the
//! environment) and sent as the `key` query parameter.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use market_core::config::ApiCredential;
use market_core::error::{MarketError, Result};
use market_core::generation::{
    Attachment, GenerationOperation, GenerationOutput, GenerationRequest, GenerationResponse,
    GenerationService, MediaAsset, ResponseModality,
};
use market_core::secret::SecretService;
use market_infrastructure::SecretServiceImpl;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const ENTITY_NOT_FOUND: &str = "Requested entity was not found";

/// Shown when a long-running operation is no longer known to the service.
pub const CREDENTIAL_RESELECT_MESSAGE: &str = "Sua chave de API pode ter expirado ou é inválida. Por favor, selecione a chave novamente.";

/// Generation service implementation that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiApiClient {
    client: Client,
    credential: ApiCredential,
    base_url: String,
}

impl GeminiApiClient {
    /// Creates a new client with the provided credential.
    pub fn new(credential: ApiCredential) -> Self {
        Self {
            client: Client::new(),
            credential,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Points the client at another API root (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builds a client from the credential held by `service`.
    pub async fn from_secret_service(service: &dyn SecretService) -> Result<Self> {
        let credential = service.gemini_credential().await?.ok_or_else(|| {
            MarketError::credential("Gemini API key not found in secret.json or environment")
        })?;
        Ok(Self::new(credential))
    }

    /// Loads the credential from the default secret storage.
    pub async fn try_from_env() -> Result<Self> {
        let service = SecretServiceImpl::default()?;
        Self::from_secret_service(&service).await
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/models/{model}:{method}?key={}",
            self.base_url,
            self.credential.expose()
        )
    }

    fn operation_url(&self, name: &str) -> String {
        format!(
            "{}/{}?key={}",
            self.base_url,
            name.trim_start_matches('/'),
            self.credential.expose()
        )
    }

    async fn post_json<B: Serialize + ?Sized>(&self, url: String, body: &B) -> Result<Response> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(request_error)?;
        ensure_success(response).await
    }

    async fn generate_content(&self, request: &GenerationRequest) -> Result<GenerationOutput> {
        let body = build_generate_content_body(request);
        tracing::debug!(
            model = %request.model,
            modality = %request.modality,
            attachments = request.attachments.len(),
            "Sending generateContent request"
        );

        let response = self
            .post_json(self.model_url(&request.model, "generateContent"), &body)
            .await?;
        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            MarketError::malformed(format!("Failed to parse Gemini response: {}", err.without_url()))
        })?;

        match request.modality {
            ResponseModality::Image => extract_image_response(parsed).map(GenerationOutput::Image),
            _ => extract_text_response(parsed).map(GenerationOutput::Text),
        }
    }

    async fn start_video(&self, request: &GenerationRequest) -> Result<GenerationOperation> {
        let body = build_video_body(request);
        tracing::debug!(model = %request.model, "Starting predictLongRunning operation");

        let response = self
            .post_json(self.model_url(&request.model, "predictLongRunning"), &body)
            .await?;
        let parsed: OperationResponse = response.json().await.map_err(|err| {
            MarketError::malformed(format!("Failed to parse Gemini operation: {}", err.without_url()))
        })?;
        Ok(parsed.into_operation())
    }
}

#[async_trait]
impl GenerationService for GeminiApiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        match request.modality {
            ResponseModality::Video => self.start_video(request).await.map(GenerationResponse::Pending),
            _ => self
                .generate_content(request)
                .await
                .map(GenerationResponse::Completed),
        }
    }

    async fn poll_operation(&self, operation: &GenerationOperation) -> Result<GenerationOperation> {
        let response = self
            .client
            .get(self.operation_url(&operation.name))
            .send()
            .await
            .map_err(request_error)?;

        let response = ensure_success(response).await.map_err(|err| {
            if is_entity_not_found(&err) {
                MarketError::credential(CREDENTIAL_RESELECT_MESSAGE)
            } else {
                err
            }
        })?;

        let parsed: OperationResponse = response.json().await.map_err(|err| {
            MarketError::malformed(format!("Failed to parse Gemini operation: {}", err.without_url()))
        })?;
        Ok(parsed.into_operation())
    }

    async fn fetch_asset(&self, uri: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(asset_url(uri, self.credential.expose()))
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketError::service(
                Some(status.as_u16()),
                format!(
                    "Falha ao buscar o vídeo: {}",
                    status.canonical_reason().unwrap_or("unknown status")
                ),
            ));
        }

        let bytes = response.bytes().await.map_err(request_error)?;
        Ok(bytes.to_vec())
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Serialize)]
struct PredictLongRunningRequest {
    instances: Vec<VideoInstance>,
    parameters: VideoParameters,
}

#[derive(Serialize)]
struct VideoInstance {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<VideoImage>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoImage {
    bytes_base64_encoded: String,
    mime_type: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoParameters {
    sample_count: u32,
    resolution: String,
    aspect_ratio: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartResponse {
    text: Option<String>,
    inline_data: Option<InlineDataResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataResponse {
    mime_type: Option<String>,
    data: String,
}

#[derive(Deserialize)]
struct OperationResponse {
    name: String,
    #[serde(default)]
    done: bool,
    response: Option<OperationResult>,
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResult {
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Deserialize)]
struct GeneratedSample {
    video: Option<VideoRef>,
}

#[derive(Deserialize)]
struct VideoRef {
    uri: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<i32>,
    message: Option<String>,
    status: Option<String>,
}

impl OperationResponse {
    fn into_operation(self) -> GenerationOperation {
        let result_uri = self
            .response
            .and_then(|result| result.generate_video_response)
            .and_then(|video| video.generated_samples.into_iter().next())
            .and_then(|sample| sample.video)
            .and_then(|video| video.uri);

        GenerationOperation {
            name: self.name,
            done: self.done,
            result_uri,
            error: self.error.map(|body| error_text(body, "")),
        }
    }
}

// ============================================================================
// Request building and response extraction
// ============================================================================

fn attachment_to_part(attachment: &Attachment) -> Part {
    Part::InlineData {
        inline_data: InlineDataPayload {
            mime_type: attachment.mime_type.clone(),
            data: attachment.to_base64(),
        },
    }
}

fn build_generate_content_body(request: &GenerationRequest) -> GenerateContentRequest {
    let mut parts = Vec::new();
    if !request.prompt.trim().is_empty() {
        parts.push(Part::Text {
            text: request.prompt.clone(),
        });
    }
    parts.extend(request.attachments.iter().map(attachment_to_part));

    let system_instruction = request.system_instruction.as_ref().map(|text| Content {
        role: "system".to_string(),
        parts: vec![Part::Text { text: text.clone() }],
    });

    let generation_config = match (&request.modality, &request.schema) {
        (ResponseModality::Image, _) => Some(GenerationConfig {
            response_modalities: Some(vec!["IMAGE".to_string()]),
            ..Default::default()
        }),
        (_, Some(schema)) => Some(GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(schema.to_json_schema()),
            ..Default::default()
        }),
        _ => None,
    };

    GenerateContentRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts,
        }],
        system_instruction,
        generation_config,
    }
}

fn build_video_body(request: &GenerationRequest) -> PredictLongRunningRequest {
    let config = request.video.clone().unwrap_or_default();
    let image = request.attachments.first().map(|attachment| VideoImage {
        bytes_base64_encoded: attachment.to_base64(),
        mime_type: attachment.mime_type.clone(),
    });

    PredictLongRunningRequest {
        instances: vec![VideoInstance {
            prompt: request.prompt.clone(),
            image,
        }],
        parameters: VideoParameters {
            sample_count: config.number_of_videos,
            resolution: config.resolution,
            aspect_ratio: config.aspect_ratio,
        },
    }
}

fn first_candidate_parts(response: GenerateContentResponse) -> Vec<PartResponse> {
    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .unwrap_or_default()
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String> {
    let text: String = first_candidate_parts(response)
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if text.is_empty() {
        return Err(MarketError::malformed(
            "Gemini API returned no text in the response candidates",
        ));
    }
    Ok(text)
}

fn extract_image_response(response: GenerateContentResponse) -> Result<MediaAsset> {
    let inline = first_candidate_parts(response)
        .into_iter()
        .find_map(|part| part.inline_data)
        .ok_or_else(|| {
            MarketError::malformed("Gemini API returned no image in the response candidates")
        })?;

    let bytes = BASE64_STANDARD.decode(inline.data.as_bytes())?;
    let mime_type = inline
        .mime_type
        .unwrap_or_else(|| "image/png".to_string());
    Ok(MediaAsset::new(bytes, mime_type))
}

fn asset_url(uri: &str, key: &str) -> String {
    let separator = if uri.contains('?') { '&' } else { '?' };
    format!("{uri}{separator}key={key}")
}

// ============================================================================
// Error mapping
// ============================================================================

fn request_error(err: reqwest::Error) -> MarketError {
    // The URL carries the key.
    MarketError::service(
        None,
        format!("Gemini API request failed: {}", err.without_url()),
    )
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
    Err(map_http_error(status, body_text))
}

fn error_text(body: ErrorBody, fallback: &str) -> String {
    let status_text = body.status.unwrap_or_default();
    let msg = body.message.unwrap_or_else(|| fallback.to_string());
    if status_text.is_empty() {
        msg
    } else {
        format!("{status_text}: {msg}")
    }
}

fn map_http_error(status: StatusCode, body: String) -> MarketError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| error_text(wrapper.error, &body))
        .unwrap_or_else(|_| body.clone());

    MarketError::service(Some(status.as_u16()), message)
}

fn is_entity_not_found(err: &MarketError) -> bool {
    match err {
        MarketError::Service {
            status_code,
            message,
        } => {
            *status_code == Some(StatusCode::NOT_FOUND.as_u16())
                || message.contains(ENTITY_NOT_FOUND)
        }
        _ => false,
    }
}
