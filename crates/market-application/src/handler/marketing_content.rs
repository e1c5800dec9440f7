use std::sync::Arc;

use market_core::error::{MarketError, Result};
use market_core::generation::{Attachment, GenerationRequest};
use market_core::invocation::{FieldSpec, ToolInvocationState};
use minijinja::context;

use super::ToolHandler;
use crate::prompt::{MARKETING_CONTENT_TEMPLATE, PromptTemplates};

const SYSTEM_INSTRUCTION: &str = "Você é um copywriter especialista em marketing. Gere conteúdo de marketing persuasivo e de alta conversão. A saída deve ser em português do Brasil e formatada com Markdown (por exemplo, usando títulos, listas e negrito).";

/// Marketing copy from a product image or a product page URL.
///
/// `image` and `url` are alternatives: setting one clears the other.
pub struct MarketingContentHandler {
    model: String,
    prompts: Arc<PromptTemplates>,
}

impl MarketingContentHandler {
    pub fn new(model: impl Into<String>, prompts: Arc<PromptTemplates>) -> Self {
        Self {
            model: model.into(),
            prompts,
        }
    }
}

impl ToolHandler for MarketingContentHandler {
    fn key(&self) -> &'static str {
        "marketing-content-generator"
    }

    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            FieldSpec::image("image", "Envie uma imagem do produto"),
            FieldSpec::url("url", "Cole a URL de um produto ou página")
                .with_placeholder("https://exemplo.com/produto"),
            FieldSpec::long_text("prompt", "Instruções Adicionais (Opcional)").with_placeholder(
                "Ex: Foque no público jovem, use um tom divertido, crie 3 opções de copy para Instagram...",
            ),
        ]
    }

    fn validation_message(&self) -> &'static str {
        "Por favor, envie uma imagem ou insira um link."
    }

    fn generic_failure(&self) -> &'static str {
        "Ocorreu um erro ao gerar o conteúdo. Verifique o console para mais detalhes."
    }

    fn validate(&self, state: &ToolInvocationState) -> Result<()> {
        if state.file("image").is_none() && !state.has_value("url") {
            return Err(MarketError::validation(self.validation_message()));
        }
        Ok(())
    }

    fn build_request(&self, state: &ToolInvocationState) -> Result<GenerationRequest> {
        let image = state.file("image");
        let prompt = self.prompts.render(
            MARKETING_CONTENT_TEMPLATE,
            context! {
                has_image => image.is_some(),
                url => state.text("url").trim(),
                prompt => state.text("prompt"),
            },
        )?;

        let mut request = GenerationRequest::text(&self.model, prompt)
            .with_system_instruction(SYSTEM_INSTRUCTION);
        if let Some(file) = image {
            request = request.with_attachment(Attachment::from(file));
        }
        Ok(request)
    }

    fn field_edited(&self, state: &mut ToolInvocationState, name: &str) {
        match name {
            "image" => state.clear_field("url"),
            "url" if state.has_value("url") => state.clear_field("image"),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_core::invocation::InputFile;

    fn handler() -> MarketingContentHandler {
        MarketingContentHandler::new("gemini-2.5-pro", Arc::new(PromptTemplates::new().unwrap()))
    }

    #[test]
    fn test_image_or_url_required() {
        let handler = handler();
        let mut state = ToolInvocationState::new(handler.key());
        state.set_field("prompt", "tom divertido");
        assert!(handler.validate(&state).unwrap_err().is_validation());

        state.set_field("url", "https://exemplo.com/produto");
        assert!(handler.validate(&state).is_ok());
    }

    #[test]
    fn test_image_and_url_are_exclusive() {
        let handler = handler();
        let mut state = ToolInvocationState::new(handler.key());
        state.set_field("url", "https://exemplo.com/produto");

        state.set_field("image", InputFile::new("p.png", "image/png", vec![1]));
        handler.field_edited(&mut state, "image");
        assert!(!state.has_value("url"));

        state.set_field("url", "https://exemplo.com/outro");
        handler.field_edited(&mut state, "url");
        assert!(state.file("image").is_none());
    }

    #[test]
    fn test_request_with_image() {
        let handler = handler();
        let mut state = ToolInvocationState::new(handler.key());
        state.set_field("image", InputFile::new("p.webp", "image/webp", vec![7, 7]));

        let request = handler.build_request(&state).unwrap();
        assert_eq!(request.model, "gemini-2.5-pro");
        assert_eq!(request.system_instruction.as_deref(), Some(SYSTEM_INSTRUCTION));
        assert_eq!(request.attachments.len(), 1);
        assert_eq!(request.attachments[0].mime_type, "image/webp");
        assert!(request.prompt.ends_with("Analise a imagem fornecida."));
    }
}
