use market_core::error::Result;
use market_core::generation::GenerationRequest;
use market_core::invocation::{FieldSpec, ToolInvocationState};

use super::{ToolHandler, required_image};

const REMOVE_BACKGROUND_PROMPT: &str =
    "remove the background of this image. The new background should be transparent.";

pub struct BackgroundRemoverHandler {
    model: String,
}

impl BackgroundRemoverHandler {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }
}

impl ToolHandler for BackgroundRemoverHandler {
    fn key(&self) -> &'static str {
        "background-remover"
    }

    fn fields(&self) -> Vec<FieldSpec> {
        vec![FieldSpec::image("image", "Envie sua Imagem").required()]
    }

    fn validation_message(&self) -> &'static str {
        "Por favor, envie uma imagem primeiro."
    }

    fn generic_failure(&self) -> &'static str {
        "Ocorreu um erro ao remover o fundo. Verifique o console para mais detalhes."
    }

    fn build_request(&self, state: &ToolInvocationState) -> Result<GenerationRequest> {
        let image = required_image(state, "image", self.validation_message())?;
        Ok(GenerationRequest::image(&self.model, REMOVE_BACKGROUND_PROMPT).with_attachment(image))
    }

    fn download_filename(&self) -> Option<&'static str> {
        Some("image-sem-fundo.png")
    }
}
