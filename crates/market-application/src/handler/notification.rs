use std::sync::Arc;

use market_core::error::Result;
use market_core::generation::GenerationRequest;
use market_core::invocation::{FieldSpec, ToolInvocationState};
use minijinja::context;

use super::ToolHandler;
use crate::prompt::{NOTIFICATION_TEMPLATE, PromptTemplates};

pub const NOTIFICATION_TYPES: [&str; 6] = [
    "Venda Aprovada",
    "Pix Recebido",
    "Boleto Gerado",
    "Produto Enviado",
    "Entrega Realizada",
    "Reembolso Solicitado",
];

pub const TONES: [&str; 4] = ["Profissional", "Amigável", "Entusiasmado", "Urgente"];

/// Transaction notifications for WhatsApp/SMS.
pub struct NotificationHandler {
    model: String,
    prompts: Arc<PromptTemplates>,
}

impl NotificationHandler {
    pub fn new(model: impl Into<String>, prompts: Arc<PromptTemplates>) -> Self {
        Self {
            model: model.into(),
            prompts,
        }
    }
}

impl ToolHandler for NotificationHandler {
    fn key(&self) -> &'static str {
        "notification-generator"
    }

    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            FieldSpec::choice("notificationType", "Tipo de Notificação", &NOTIFICATION_TYPES),
            FieldSpec::text("customerName", "Nome do Cliente")
                .required()
                .with_placeholder("Ex: João da Silva"),
            FieldSpec::text("productName", "Nome do Produto")
                .required()
                .with_placeholder("Ex: Tênis de Corrida XYZ"),
            FieldSpec::text("value", "Valor (R$)")
                .required()
                .with_placeholder("Ex: 199,90"),
            FieldSpec::long_text("additionalInfo", "Informações Adicionais (Opcional)")
                .with_placeholder("Ex: Cód. de Rastreio: BR123XYZ"),
            FieldSpec::choice("tone", "Tom da Mensagem", &TONES),
        ]
    }

    fn validation_message(&self) -> &'static str {
        "Por favor, preencha os campos obrigatórios: Nome do Cliente, Nome do Produto e Valor."
    }

    fn generic_failure(&self) -> &'static str {
        "Ocorreu um erro ao gerar a notificação. Verifique o console para mais detalhes."
    }

    fn build_request(&self, state: &ToolInvocationState) -> Result<GenerationRequest> {
        let prompt = self.prompts.render(
            NOTIFICATION_TEMPLATE,
            context! {
                notification_type => state.text("notificationType"),
                customer_name => state.text("customerName"),
                product_name => state.text("productName"),
                value => state.text("value"),
                tone => state.text("tone"),
                additional_info => state.text("additionalInfo"),
            },
        )?;
        Ok(GenerationRequest::text(&self.model, prompt))
    }
}
