use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use market_core::error::{MarketError, Result};
use market_core::generation::{GenerationOutput, GenerationRequest, ResponseSchema};
use market_core::invocation::{FieldSpec, ToolInvocationState};
use minijinja::context;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use super::ToolHandler;
use crate::prompt::{PIX_RECEIPT_TEMPLATE, PromptTemplates};

/// Field name, label and schema description of every receipt field.
const RECEIPT_FIELDS: [(&str, &str, &str); 6] = [
    ("payerName", "Nome do Pagador", "Nome completo de quem enviou o PIX"),
    ("receiverName", "Nome do Recebedor", "Nome completo de quem recebeu o PIX"),
    ("amount", "Valor (R$)", "Valor transferido no formato 0,00"),
    ("date", "Data e Hora", "Data e hora da transação no formato DD/MM/AAAA HH:MM"),
    ("transactionId", "ID da Transação", "Identificador end-to-end da transação"),
    ("bank", "Banco", "Nome da instituição financeira do pagador"),
];

/// A Markdown code fence around the whole answer: ```json ... ```
static JSON_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").expect("Invalid JSON fence regex")
});

#[derive(Serialize)]
struct ProvidedField<'a> {
    label: &'a str,
    value: &'a str,
}

/// PIX receipt mockups. Every field is optional; the AI fills in the rest.
pub struct PixReceiptHandler {
    model: String,
    prompts: Arc<PromptTemplates>,
}

impl PixReceiptHandler {
    pub fn new(model: impl Into<String>, prompts: Arc<PromptTemplates>) -> Self {
        Self {
            model: model.into(),
            prompts,
        }
    }

    fn schema() -> ResponseSchema {
        RECEIPT_FIELDS
            .iter()
            .fold(ResponseSchema::new(), |schema, (name, _, description)| {
                schema.string(*name, *description)
            })
    }
}

impl ToolHandler for PixReceiptHandler {
    fn key(&self) -> &'static str {
        "pix-receipt-generator"
    }

    fn fields(&self) -> Vec<FieldSpec> {
        RECEIPT_FIELDS
            .iter()
            .map(|(name, label, _)| FieldSpec::text(*name, *label))
            .collect()
    }

    fn validation_message(&self) -> &'static str {
        "Por favor, revise os dados do comprovante."
    }

    fn generic_failure(&self) -> &'static str {
        "Ocorreu um erro ao gerar os dados do comprovante. Tente novamente."
    }

    fn build_request(&self, state: &ToolInvocationState) -> Result<GenerationRequest> {
        let provided: Vec<ProvidedField<'_>> = RECEIPT_FIELDS
            .iter()
            .filter(|(name, _, _)| state.has_value(name))
            .map(|(name, label, _)| ProvidedField {
                label: *label,
                value: state.text(name).trim(),
            })
            .collect();

        let prompt = self
            .prompts
            .render(PIX_RECEIPT_TEMPLATE, context! { provided => provided })?;
        Ok(GenerationRequest::text(&self.model, prompt).with_schema(Self::schema()))
    }

    fn normalize_output(&self, output: GenerationOutput) -> Result<GenerationOutput> {
        match output {
            GenerationOutput::Text(raw) => parse_receipt(&raw).map(GenerationOutput::Fields),
            other => Ok(other),
        }
    }
}

/// Parses the JSON answer, tolerating a Markdown code fence around it.
fn parse_receipt(raw: &str) -> Result<BTreeMap<String, String>> {
    let json = JSON_FENCE
        .captures(raw)
        .and_then(|captures| captures.get(1))
        .map_or(raw.trim(), |body| body.as_str());

    let value: Value = serde_json::from_str(json)?;
    let object = value
        .as_object()
        .ok_or_else(|| MarketError::malformed("expected a JSON object"))?;

    let fields: BTreeMap<String, String> = RECEIPT_FIELDS
        .iter()
        .filter_map(|(name, _, _)| {
            let text = match object.get(*name)? {
                Value::String(text) => text.clone(),
                Value::Null => return None,
                other => other.to_string(),
            };
            Some((name.to_string(), text))
        })
        .collect();

    if fields.is_empty() {
        return Err(MarketError::malformed("no receipt fields in response"));
    }
    Ok(fields)
}
