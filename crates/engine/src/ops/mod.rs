use sea_orm::DatabaseConnection;

use crate::{EngineError, ResultEngine};

mod access;
mod balances;
mod categories;
mod import;
mod movements;
mod sub_categories;
mod transactions;
mod type_payments;
mod wallets;

pub use import::ImportSummary;
pub use movements::{MovementNew, MovementPatch};
pub use transactions::TransactionNew;

/// Run a block inside a DB transaction, committing on success and rolling back
/// on error. Errors leaving the block are prefixed with `$context`.
///
/// The block evaluates to the plain value; `?` and `return Err(..)` inside it
/// abort the transaction.
macro_rules! with_tx {
    ($self:expr, $context:expr, |$tx:ident| $body:expr) => {{
        let outcome = async {
            let $tx = $self.database.begin().await?;
            let value = $body;
            $tx.commit().await?;
            Ok::<_, $crate::EngineError>(value)
        }
        .await;
        outcome.map_err(|err| err.context($context))
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!(
            "{label} description must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn ensure_finite(amount: f64, label: &str) -> ResultEngine<f64> {
    if !amount.is_finite() {
        return Err(EngineError::Validation(format!(
            "{label} must be a finite number"
        )));
    }
    Ok(amount)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
