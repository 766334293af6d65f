//! Budgeting tips from a generative-text service.
//!
//! Advice is best-effort: nothing here can fail the caller. An empty ledger
//! short-circuits to a static hint, and any provider error is logged and
//! replaced by a fixed fallback message.

use std::future::Future;

use serde::Serialize;
use thiserror::Error;

use crate::domain::{Category, Transaction, TransactionType};

mod gemini;
mod mailbox;

pub use gemini::*;
pub use mailbox::*;

/// Returned without calling the provider when there is nothing to analyse.
pub const EMPTY_LEDGER_MESSAGE: &str =
    "Adicione algumas transações para receber conselhos financeiros personalizados.";

/// Substituted when the provider fails.
pub const FALLBACK_MESSAGE: &str =
    "Não foi possível gerar dicas no momento. Revise seus gastos manualmente.";

/// Substituted when the provider answers with blank text.
pub const NO_TIPS_MESSAGE: &str = "Sem dicas no momento.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdviceError {
    #[error("API key not configured")]
    MissingKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A generative-text backend: single-turn prompt in, plain text out.
pub trait AdviceProvider: Send + Sync + 'static {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, AdviceError>> + Send;
}

#[derive(Serialize)]
struct PromptEntry<'a> {
    tipo: TransactionType,
    valor: f64,
    categoria: Category,
    desc: &'a str,
}

/// Build the single-turn prompt: an instruction followed by the ledger's
/// type, amount, category and description as a JSON array.
pub fn build_prompt(transactions: &[Transaction]) -> String {
    let entries: Vec<PromptEntry<'_>> = transactions
        .iter()
        .map(|t| PromptEntry {
            tipo: t.transaction_type,
            valor: t.amount as f64 / 100.0,
            categoria: t.category,
            desc: &t.description,
        })
        .collect();
    // Serializing plain strings and numbers cannot fail
    let payload = serde_json::to_string(&entries).unwrap_or_else(|_| "[]".to_string());

    format!(
        "Analise o seguinte fluxo de caixa doméstico e forneça 3 dicas curtas e práticas de economia ou gestão:\n{}\nResponda em Português do Brasil.",
        payload
    )
}

/// Ask the provider for tips on `transactions`.
///
/// Always yields displayable text.
pub async fn get_financial_advice<P: AdviceProvider>(
    provider: &P,
    transactions: &[Transaction],
) -> String {
    if transactions.is_empty() {
        return EMPTY_LEDGER_MESSAGE.to_string();
    }

    let prompt = build_prompt(transactions);
    match provider.generate(&prompt).await {
        Ok(text) if text.trim().is_empty() => NO_TIPS_MESSAGE.to_string(),
        Ok(text) => text,
        Err(err) => {
            tracing::error!(error = %err, "failed to get financial advice");
            FALLBACK_MESSAGE.to_string()
        }
    }
}
