use market_core::error::{MarketError, Result};
use market_core::generation::{GenerationRequest, VideoConfig};
use market_core::invocation::{FieldSpec, ToolInvocationState};

use super::{ToolHandler, required_image};
use crate::controller::NO_VIDEO_RESULT_MESSAGE;

const SPIN_PROMPT: &str = "Create a 360-degree, slow-spinning product video of the object in this image. The background should be a clean, neutral studio light gray (#f3f4f6). The object should be perfectly centered and well-lit from all angles, simulating a professional product photoshoot. The rotation should be smooth and continuous.";

pub const RENDERING_MESSAGES: [&str; 9] = [
    "Inicializando o motor de renderização...",
    "Analisando a geometria da imagem 2D...",
    "Extrudando pixels para a terceira dimensão...",
    "Aplicando texturas e materiais fotorrealistas...",
    "Configurando a iluminação do estúdio virtual...",
    "Renderizando a rotação de 360 graus, quadro a quadro...",
    "Compilando os quadros em um vídeo de alta definição...",
    "Adicionando os toques finais de polimento...",
    "Quase pronto! Finalizando o seu mockup 3D...",
];

/// Turns a product photo into a spinning 3D video (long-running).
pub struct Mockup3dHandler {
    model: String,
}

impl Mockup3dHandler {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }
}

impl ToolHandler for Mockup3dHandler {
    fn key(&self) -> &'static str {
        "mockup-3d-generator"
    }

    fn fields(&self) -> Vec<FieldSpec> {
        vec![FieldSpec::image("image", "1. Envie a Imagem do Produto").required()]
    }

    fn validation_message(&self) -> &'static str {
        "Por favor, envie uma imagem primeiro."
    }

    fn generic_failure(&self) -> &'static str {
        "Ocorreu um erro ao gerar o vídeo. Verifique o console."
    }

    fn build_request(&self, state: &ToolInvocationState) -> Result<GenerationRequest> {
        let image = required_image(state, "image", self.validation_message())?;
        Ok(
            GenerationRequest::video(&self.model, SPIN_PROMPT, VideoConfig::default())
                .with_attachment(image),
        )
    }

    fn failure_message(&self, error: &MarketError) -> String {
        match error {
            MarketError::Credential(message) => message.clone(),
            MarketError::MalformedResponse(message) if message == NO_VIDEO_RESULT_MESSAGE => {
                message.clone()
            }
            MarketError::PollingTimeout { attempts } => format!(
                "A geração do vídeo não foi concluída após {attempts} verificações. Tente novamente."
            ),
            MarketError::Service {
                status_code: Some(_),
                message,
            } if message.starts_with("Falha ao buscar o vídeo") => message.clone(),
            _ => self.generic_failure().to_string(),
        }
    }

    fn download_filename(&self) -> Option<&'static str> {
        Some("mockup-3d.mp4")
    }

    fn requires_credential(&self) -> bool {
        true
    }

    fn progress_messages(&self) -> &'static [&'static str] {
        &RENDERING_MESSAGES
    }
}
