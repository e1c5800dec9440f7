//! Prompt templates rendered with minijinja.

use market_core::error::{MarketError, Result};
use minijinja::Environment;
use serde::Serialize;

pub const NOTIFICATION_TEMPLATE: &str = "notification.txt";
pub const MARKETING_CONTENT_TEMPLATE: &str = "marketing_content.txt";
pub const PIX_RECEIPT_TEMPLATE: &str = "pix_receipt.txt";

const NOTIFICATION_SOURCE: &str = r#"Crie uma notificação de transação do tipo "{{ notification_type }}" para o cliente "{{ customer_name }}".
O produto é "{{ product_name }}" no valor de R${{ value }}.
O tom da mensagem deve ser "{{ tone }}".
{% if additional_info %}Informações adicionais a serem incluídas: "{{ additional_info }}".{% endif %}
A notificação deve ser concisa, clara e objetiva, adequada para ser enviada por WhatsApp ou SMS. Não inclua saudações genéricas como "Olá," no início, comece direto com o nome do cliente se necessário ou a informação principal."#;

const MARKETING_CONTENT_SOURCE: &str = r#"Gere um conteúdo de marketing com base na seguinte entrada.{% if has_image %} Analise a imagem fornecida.{% endif %}{% if url %} Analise o conteúdo desta URL: {{ url }}.{% endif %}{% if prompt %}

Instruções adicionais do usuário: "{{ prompt }}"{% endif %}"#;

const PIX_RECEIPT_SOURCE: &str = r#"Gere dados fictícios e realistas para um comprovante de transferência PIX brasileiro.
Responda apenas com um objeto JSON contendo: nome do pagador, nome do recebedor, valor em reais (formato 0,00), data e hora (DD/MM/AAAA HH:MM), ID da transação (32 caracteres alfanuméricos começando com "E") e nome do banco.
{% for field in provided %}{% if loop.first %}Mantenha exatamente estes valores já informados:
{% endif %}- {{ field.label }}: {{ field.value }}
{% endfor %}"#;

const TEMPLATES: [(&str, &str); 3] = [
    (NOTIFICATION_TEMPLATE, NOTIFICATION_SOURCE),
    (MARKETING_CONTENT_TEMPLATE, MARKETING_CONTENT_SOURCE),
    (PIX_RECEIPT_TEMPLATE, PIX_RECEIPT_SOURCE),
];

/// The compiled prompt templates of all text tools.
pub struct PromptTemplates {
    env: Environment<'static>,
}

impl PromptTemplates {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(name, source).map_err(template_error)?;
        }
        Ok(Self { env })
    }

    /// Renders template `name` with `context`. Missing variables render empty.
    pub fn render<S: Serialize>(&self, name: &str, context: S) -> Result<String> {
        let template = self.env.get_template(name).map_err(template_error)?;
        template.render(context).map_err(template_error)
    }
}

fn template_error(err: minijinja::Error) -> MarketError {
    MarketError::internal(format!("prompt template error: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_notification_prompt() {
        let prompts = PromptTemplates::new().unwrap();
        let prompt = prompts
            .render(
                NOTIFICATION_TEMPLATE,
                context! {
                    notification_type => "Venda Aprovada",
                    customer_name => "João",
                    product_name => "Tênis",
                    value => "199,90",
                    tone => "Profissional",
                    additional_info => "",
                },
            )
            .unwrap();

        assert!(prompt.starts_with(
            "Crie uma notificação de transação do tipo \"Venda Aprovada\" para o cliente \"João\".\n"
        ));
        assert!(prompt.contains("no valor de R$199,90."));
        assert!(!prompt.contains("Informações adicionais"));
    }

    #[test]
    fn test_marketing_prompt_variants() {
        let prompts = PromptTemplates::new().unwrap();
        let image_only = prompts
            .render(MARKETING_CONTENT_TEMPLATE, context! { has_image => true })
            .unwrap();
        assert_eq!(
            image_only,
            "Gere um conteúdo de marketing com base na seguinte entrada. Analise a imagem fornecida."
        );

        let url_and_prompt = prompts
            .render(
                MARKETING_CONTENT_TEMPLATE,
                context! { url => "https://exemplo.com/produto", prompt => "tom divertido" },
            )
            .unwrap();
        assert_eq!(
            url_and_prompt,
            "Gere um conteúdo de marketing com base na seguinte entrada. Analise o conteúdo desta URL: https://exemplo.com/produto.\n\nInstruções adicionais do usuário: \"tom divertido\""
        );
    }

    #[test]
    fn test_unknown_template() {
        let prompts = PromptTemplates::new().unwrap();
        assert!(prompts.render("missing.txt", context! {}).is_err());
    }
}
