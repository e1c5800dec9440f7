//! Generation request value objects.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde_json::{Map, Value, json};
use strum::{Display, EnumString};

use crate::invocation::InputFile;

/// What kind of payload the caller expects back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Default)]
#[strum(serialize_all = "lowercase")]
pub enum ResponseModality {
    #[default]
    Text,
    Image,
    Video,
}

/// Inline bytes sent alongside the prompt.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl Attachment {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Standard base64 encoding of the bytes, without a data-URL prefix.
    pub fn to_base64(&self) -> String {
        BASE64_STANDARD.encode(&self.bytes)
    }
}

impl From<&InputFile> for Attachment {
    fn from(file: &InputFile) -> Self {
        Self::new(file.bytes.clone(), file.mime_type.clone())
    }
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// One named string property of a structured response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaProperty {
    pub name: String,
    pub description: String,
}

/// Constrained JSON response shape: an object of named string properties.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseSchema {
    pub properties: Vec<SchemaProperty>,
}

impl ResponseSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn string(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.properties.push(SchemaProperty {
            name: name.into(),
            description: description.into(),
        });
        self
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|p| p.name.as_str())
    }

    /// Renders the schema in the OpenAPI subset the Gemini API accepts.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for property in &self.properties {
            properties.insert(
                property.name.clone(),
                json!({ "type": "STRING", "description": property.description }),
            );
        }
        let names: Vec<&str> = self.property_names().collect();
        json!({
            "type": "OBJECT",
            "properties": properties,
            "required": names,
            "propertyOrdering": names,
        })
    }
}

/// Video generation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoConfig {
    pub number_of_videos: u32,
    pub resolution: String,
    pub aspect_ratio: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            number_of_videos: 1,
            resolution: "720p".to_string(),
            aspect_ratio: "1:1".to_string(),
        }
    }
}

/// A single request to the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub system_instruction: Option<String>,
    pub attachments: Vec<Attachment>,
    pub modality: ResponseModality,
    pub schema: Option<ResponseSchema>,
    pub video: Option<VideoConfig>,
}

impl GenerationRequest {
    /// A plain text request.
    pub fn text(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system_instruction: None,
            attachments: Vec::new(),
            modality: ResponseModality::Text,
            schema: None,
            video: None,
        }
    }

    /// A request whose answer is an image.
    pub fn image(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            modality: ResponseModality::Image,
            ..Self::text(model, prompt)
        }
    }

    /// A long-running video request.
    pub fn video(model: impl Into<String>, prompt: impl Into<String>, config: VideoConfig) -> Self {
        Self {
            modality: ResponseModality::Video,
            video: Some(config),
            ..Self::text(model, prompt)
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Asks for JSON matching `schema` instead of free text.
    pub fn with_schema(mut self, schema: ResponseSchema) -> Self {
        self.schema = Some(schema);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_base64() {
        let attachment = Attachment::new(b"hello".to_vec(), "image/png");
        assert_eq!(attachment.to_base64(), "aGVsbG8=");
        assert!(!format!("{attachment:?}").contains("104"));
    }

    #[test]
    fn test_schema_json() {
        let schema = ResponseSchema::new()
            .string("payerName", "Nome do pagador")
            .string("amount", "Valor");
        let json = schema.to_json_schema();
        assert_eq!(json["type"], "OBJECT");
        assert_eq!(json["properties"]["payerName"]["type"], "STRING");
        assert_eq!(json["required"], json!(["payerName", "amount"]));
    }

    #[test]
    fn test_request_builders() {
        let request = GenerationRequest::video("veo", "spin", VideoConfig::default())
            .with_attachment(Attachment::new(vec![1, 2, 3], "image/jpeg"));
        assert_eq!(request.modality, ResponseModality::Video);
        assert_eq!(request.video.as_ref().unwrap().resolution, "720p");
        assert_eq!(request.attachments.len(), 1);

        let request = GenerationRequest::image("img", "remove background");
        assert_eq!(request.modality, ResponseModality::Image);
        assert!(request.video.is_none());
    }
}
