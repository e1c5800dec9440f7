//! Built-in tool catalog.

use std::collections::{HashMap, HashSet};

use strum::IntoEnumIterator;

use super::model::{ToolCategory, ToolDescriptor, ToolLaunch};
use crate::config::ToolOverride;
use crate::error::{MarketError, Result};

const TRANSLATOR_URL: &str = "https://tradutor-nine.vercel.app/";

/// Read-only list of tool descriptors, resolved by key.
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    tools: Vec<ToolDescriptor>,
}

impl ToolCatalog {
    /// Builds a catalog from descriptors, rejecting empty or duplicate keys.
    pub fn from_descriptors(tools: Vec<ToolDescriptor>) -> Result<Self> {
        let mut seen = HashSet::new();
        for tool in &tools {
            if tool.key.trim().is_empty() {
                return Err(MarketError::config(format!(
                    "Tool '{}' has an empty key",
                    tool.title
                )));
            }
            if !seen.insert(tool.key.as_str()) {
                return Err(MarketError::config(format!(
                    "Duplicate tool key: {}",
                    tool.key
                )));
            }
        }
        Ok(Self { tools })
    }

    /// The catalog shipped with Market Suite.
    pub fn builtin() -> Self {
        Self {
            tools: builtin_descriptors(),
        }
    }

    /// All descriptors in grid order.
    pub fn all(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Gets a descriptor by its key.
    pub fn get(&self, key: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.key == key)
    }

    /// Returns the descriptors of one category, in grid order.
    pub fn by_category(&self, category: ToolCategory) -> Vec<&ToolDescriptor> {
        self.tools
            .iter()
            .filter(|t| t.category == category)
            .collect()
    }

    /// Groups descriptors by category, skipping empty categories.
    pub fn grouped(&self) -> Vec<(ToolCategory, Vec<&ToolDescriptor>)> {
        ToolCategory::iter()
            .map(|category| (category, self.by_category(category)))
            .filter(|(_, tools)| !tools.is_empty())
            .collect()
    }

    /// Applies per-tool launch overrides from configuration.
    ///
    /// A non-empty `redirect_url` turns the tool into a redirect; an empty one
    /// forces it inline.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, ToolOverride>) -> Result<()> {
        for (key, tool_override) in overrides {
            let tool = self
                .tools
                .iter_mut()
                .find(|t| &t.key == key)
                .ok_or_else(|| MarketError::not_found("tool", key.clone()))?;

            if let Some(url) = &tool_override.redirect_url {
                tool.launch = if url.trim().is_empty() {
                    ToolLaunch::Inline
                } else {
                    ToolLaunch::Redirect { url: url.clone() }
                };
            }
        }
        Ok(())
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_descriptors() -> Vec<ToolDescriptor> {
    use ToolCategory::*;

    vec![
        ToolDescriptor::new(
            "mockup-3d-generator",
            "Gerador de Mockups 3D",
            "Transforme imagens 2D em visualizações 3D ou 360° imersivas e profissionais.",
            Visual,
            "cube-transparent",
        ),
        ToolDescriptor::new(
            "profitability-calculator",
            "Calculadora de Lucratividade",
            "Simule cenários, compare marketplaces e otimize suas vendas no Brasil.",
            Strategy,
            "currency-dollar",
        ),
        ToolDescriptor::new(
            "faq-generator",
            "Gerador de FAQ",
            "Faça upload da imagem de um produto e crie 40 perguntas e respostas frequentes.",
            Content,
            "chat-bubble-bottom-center-text",
        ),
        ToolDescriptor::new(
            "caption-generator",
            "Gerador de Legendas",
            "Descreva seu post e deixe a IA criar legendas perfeitas para suas redes sociais.",
            Content,
            "pencil-square",
        ),
        ToolDescriptor::new(
            "watermark-remover",
            "Removedor de Marcas D'água",
            "Limpe suas imagens com o poder da inteligência artificial para um look profissional.",
            Visual,
            "sparkles",
        ),
        ToolDescriptor::new(
            "policy-generator",
            "Gerador de Políticas",
            "Crie políticas de troca e devolução profissionais para sua loja em segundos.",
            Strategy,
            "document-text",
        ),
        ToolDescriptor::new(
            "banner-generator",
            "Gerador de Banners",
            "Crie banners promocionais de alta conversão para marketplaces em segundos.",
            Visual,
            "photo",
        ),
        ToolDescriptor::new(
            "marketing-content-generator",
            "Gerador de Conteúdo de Marketing",
            "Envie uma imagem ou link e a IA criará textos de alta conversão para suas necessidades.",
            Content,
            "cpu-chip",
        ),
        ToolDescriptor::new(
            "ad-optimizer",
            "Otimizador de Anúncios",
            "Cole a URL do seu produto e deixe a IA analisar e criar um anúncio perfeito.",
            Content,
            "adjustments-horizontal",
        ),
        ToolDescriptor::new(
            "ppc-ad-generator",
            "Gerador de Anúncios (PPC)",
            "Crie textos de anúncios de alta conversão para Google Ads e Meta Ads.",
            Content,
            "presentation-chart-line",
        ),
        ToolDescriptor::new(
            "name-slogan-generator",
            "Gerador de Nomes e Slogans",
            "Crie nomes criativos e slogans memoráveis para seus produtos e marcas.",
            Strategy,
            "light-bulb",
        ),
        ToolDescriptor::new(
            "post-generator",
            "Gerador de Posts (Blog/Social)",
            "Produza artigos e posts otimizados para SEO e engajamento em múltiplas plataformas.",
            Content,
            "hashtag",
        ),
        ToolDescriptor::new(
            "live-script-generator",
            "Gerador de Roteiros para Lives",
            "Crie scripts detalhados e interativos para suas lives de vendas e lançamentos.",
            Strategy,
            "film",
        ),
        ToolDescriptor::new(
            "meme-generator",
            "Gerador de Memes",
            "Transforme imagens em conteúdo viral com humor e criatividade gerados por IA.",
            Visual,
            "heart",
        ),
        ToolDescriptor::new(
            "story-image-generator",
            "Gerador de Imagens para Stories",
            "Crie visuais incríveis para seus stories. Descreva um cenário e deixe a IA fazer a mágica.",
            Visual,
            "device-phone-mobile",
        ),
        ToolDescriptor::new(
            "pricing-strategy-generator",
            "Gerador de Estratégias de Preço",
            "Simule preços ideais com base em custos, concorrência e demanda sazonal.",
            Strategy,
            "beaker",
        ),
        ToolDescriptor::new(
            "file-converter",
            "Conversores de Arquivos",
            "Converta imagens e arquivos PDF para diversos formatos com facilidade.",
            Utilities,
            "document-duplicate",
        ),
        ToolDescriptor::new(
            "coupon-generator",
            "Gerador de Cupons",
            "Crie, gerencie e valide cupons de desconto para suas campanhas de marketing.",
            Utilities,
            "ticket",
        ),
        ToolDescriptor::new(
            "google-shopping-ads",
            "Anúncios Google Shopping",
            "Gere e otimize seus anúncios para a plataforma Google Shopping automaticamente.",
            Content,
            "shopping-cart",
        ),
        ToolDescriptor::new(
            "notification-generator",
            "Gerador de Notificações",
            "Crie e personalize alertas de transações com um design profissional e tom de voz customizado.",
            Utilities,
            "bell",
        ),
        ToolDescriptor::new(
            "visual-variations-generator",
            "Gerador de Variações Visuais com IA",
            "Envie uma imagem, descreva a alteração e deixe a IA criar algo novo para você.",
            Visual,
            "paint-brush",
        ),
        ToolDescriptor::new(
            "background-remover",
            "Removedor de Fundo Profissional",
            "Com a tecnologia do Gemini AI, remova fundos de imagens com um clique.",
            Visual,
            "scissors",
        ),
        ToolDescriptor::new(
            "pix-receipt-generator",
            "Gerador de Comprovante PIX",
            "Preencha os campos manualmente ou use a IA para gerar dados aleatórios e visualizar um modelo de comprovante.",
            Utilities,
            "document-check",
        ),
        ToolDescriptor::new(
            "translator",
            "Tradutor",
            "Traduza textos e anúncios para outros idiomas.",
            Utilities,
            "language",
        )
        .with_redirect(TRANSLATOR_URL),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_keys_are_unique() {
        let builtin = ToolCatalog::builtin();
        let rebuilt = ToolCatalog::from_descriptors(builtin.all().to_vec());
        assert!(rebuilt.is_ok());
        assert_eq!(builtin.len(), 24);
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let tool = ToolDescriptor::new("dup", "A", "a", ToolCategory::Content, "x");
        let result = ToolCatalog::from_descriptors(vec![tool.clone(), tool]);
        assert!(matches!(result, Err(MarketError::Config(_))));
    }

    #[test]
    fn test_get_and_group() {
        let catalog = ToolCatalog::builtin();
        let translator = catalog.get("translator").unwrap();
        assert_eq!(translator.redirect_url(), Some(TRANSLATOR_URL));
        assert!(catalog.get("does-not-exist").is_none());

        let grouped = catalog.grouped();
        assert_eq!(grouped.len(), 4);
        let total: usize = grouped.iter().map(|(_, tools)| tools.len()).sum();
        assert_eq!(total, catalog.len());
    }

    #[test]
    fn test_apply_overrides() {
        let mut catalog = ToolCatalog::builtin();
        let mut overrides = HashMap::new();
        overrides.insert(
            "watermark-remover".to_string(),
            ToolOverride {
                redirect_url: Some("https://watermark.example.com".to_string()),
            },
        );
        overrides.insert(
            "translator".to_string(),
            ToolOverride {
                redirect_url: Some(String::new()),
            },
        );
        catalog.apply_overrides(&overrides).unwrap();

        assert_eq!(
            catalog.get("watermark-remover").unwrap().redirect_url(),
            Some("https://watermark.example.com")
        );
        assert_eq!(catalog.get("translator").unwrap().launch, ToolLaunch::Inline);
    }

    #[test]
    fn test_override_unknown_tool() {
        let mut catalog = ToolCatalog::builtin();
        let mut overrides = HashMap::new();
        overrides.insert("nope".to_string(), ToolOverride::default());
        let err = catalog.apply_overrides(&overrides).unwrap_err();
        assert!(err.is_not_found());
    }
}
