//! Tool descriptor models.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Category a tool is grouped under in the catalog grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(ascii_case_insensitive)]
pub enum ToolCategory {
    #[strum(to_string = "Visual & Imagem", serialize = "visual")]
    Visual,
    #[strum(to_string = "Estratégia & Análise", serialize = "strategy")]
    Strategy,
    #[strum(to_string = "Conteúdo & Copy", serialize = "content")]
    Content,
    #[strum(to_string = "Utilitários", serialize = "utilities")]
    Utilities,
}

/// How a tool is opened when selected from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ToolLaunch {
    /// The tool is rendered by this application.
    #[default]
    Inline,
    /// The tool lives in a separately hosted application.
    Redirect { url: String },
}

/// Immutable description of a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Unique key used for lookup (kebab-case).
    pub key: String,
    /// Title shown on the card.
    pub title: String,
    /// One-sentence description shown on the card.
    pub description: String,
    /// Grid category.
    pub category: ToolCategory,
    /// Icon reference (heroicons outline name).
    pub icon: String,
    /// Inline or redirect.
    #[serde(default)]
    pub launch: ToolLaunch,
}

impl ToolDescriptor {
    /// Creates an inline tool descriptor.
    pub fn new(
        key: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        category: ToolCategory,
        icon: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            description: description.into(),
            category,
            icon: icon.into(),
            launch: ToolLaunch::Inline,
        }
    }

    /// Marks the tool as hosted elsewhere.
    pub fn with_redirect(mut self, url: impl Into<String>) -> Self {
        self.launch = ToolLaunch::Redirect { url: url.into() };
        self
    }

    /// Returns the redirect target, if the tool is hosted elsewhere.
    pub fn redirect_url(&self) -> Option<&str> {
        match &self.launch {
            ToolLaunch::Redirect { url } => Some(url),
            ToolLaunch::Inline => None,
        }
    }
}
