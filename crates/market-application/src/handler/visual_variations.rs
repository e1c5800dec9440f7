use market_core::error::Result;
use market_core::generation::GenerationRequest;
use market_core::invocation::{FieldSpec, ToolInvocationState};

use super::{ToolHandler, required_image};

/// Edits an uploaded image following a free-text instruction.
pub struct VisualVariationsHandler {
    model: String,
}

impl VisualVariationsHandler {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }
}

impl ToolHandler for VisualVariationsHandler {
    fn key(&self) -> &'static str {
        "visual-variations-generator"
    }

    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            FieldSpec::image("image", "1. Envie sua Imagem").required(),
            FieldSpec::long_text("prompt", "2. Descreva a Alteração")
                .required()
                .with_placeholder(
                    "Ex: Adicione um chapéu de sol na pessoa. Mude a cor do carro para vermelho. Transforme o cenário em um dia de neve.",
                ),
        ]
    }

    fn validation_message(&self) -> &'static str {
        "Por favor, envie uma imagem e descreva a alteração desejada."
    }

    fn generic_failure(&self) -> &'static str {
        "Ocorreu um erro ao gerar a variação. Verifique o console para mais detalhes."
    }

    fn build_request(&self, state: &ToolInvocationState) -> Result<GenerationRequest> {
        let image = required_image(state, "image", self.validation_message())?;
        Ok(GenerationRequest::image(&self.model, state.text("prompt")).with_attachment(image))
    }

    fn download_filename(&self) -> Option<&'static str> {
        Some("variacao-ia.png")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_core::generation::ResponseModality;
    use market_core::invocation::InputFile;

    #[test]
    fn test_blank_prompt_is_rejected() {
        let handler = VisualVariationsHandler::new("gemini-2.5-flash-image");
        let mut state = ToolInvocationState::new(handler.key());
        state.set_field("image", InputFile::new("a.png", "image/png", vec![1]));
        state.set_field("prompt", "   ");
        assert!(handler.validate(&state).is_err());

        state.set_field("prompt", "Mude a cor do carro para vermelho");
        let request = handler.build_request(&state).unwrap();
        assert_eq!(request.modality, ResponseModality::Image);
        assert_eq!(request.prompt, "Mude a cor do carro para vermelho");
        assert_eq!(request.attachments.len(), 1);
    }
}
