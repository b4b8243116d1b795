use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{
    DEFAULT_OWNER, EngineError, MovementStatus, ResultEngine, UplannerRow, categories,
    parse_uplanner, sub_categories, wallets,
};

use super::{Engine, MovementNew, with_tx};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub paid: usize,
    pub planned: usize,
}

/// Lookup tables loaded once per import.
struct Names {
    categories: Vec<categories::Model>,
    sub_categories: Vec<sub_categories::Model>,
    wallets: Vec<wallets::Model>,
}

/// Matching key for a name: case, accents and punctuation are ignored, so
/// `Salário` and `salario` resolve to the same row.
fn name_key(input: &str) -> String {
    let mut out = String::new();
    let mut pending_space = false;
    for ch in input.trim().nfkd().filter(|ch| !is_combining_mark(*ch)) {
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    out
}

fn same_name(a: &str, b: &str) -> bool {
    name_key(a) == name_key(b)
}

impl Names {
    fn resolve(&self, row: &UplannerRow) -> Result<MovementNew, String> {
        let line = row.line;
        let category = self
            .categories
            .iter()
            .find(|c| same_name(&c.description, &row.category))
            .ok_or_else(|| format!("line {line}: unknown category '{}'", row.category))?;

        let sub_category_id = match row.sub_category.as_deref() {
            None => None,
            Some(name) => Some(
                self.sub_categories
                    .iter()
                    .find(|s| s.category_id == category.id && same_name(&s.description, name))
                    .map(|s| s.id)
                    .ok_or_else(|| {
                        format!(
                            "line {line}: unknown sub-category '{name}' in '{}'",
                            category.description
                        )
                    })?,
            ),
        };

        let wallet = self
            .wallets
            .iter()
            .find(|w| same_name(&w.description, &row.wallet))
            .ok_or_else(|| format!("line {line}: unknown wallet '{}'", row.wallet))?;

        Ok(MovementNew {
            description: row.description.clone(),
            amount: row.amount,
            date: row.date,
            wallet_id: wallet.id,
            type_payment_id: None,
            category_id: Some(category.id),
            sub_category_id,
            status: row.status,
            transaction_id: None,
        })
    }
}

impl Engine {
    /// Import a uPlanner export.
    ///
    /// Every line is checked before anything is written. If one line is
    /// invalid the whole file is rejected with the full list of errors;
    /// otherwise all movements and their wallet updates are committed
    /// together.
    pub async fn import_uplanner(&self, body: &str, user_id: &str) -> ResultEngine<ImportSummary> {
        with_tx!(self, "error to import uplanner file", |db_tx| {
            let owners = [user_id, DEFAULT_OWNER];
            let names = Names {
                categories: categories::Entity::find()
                    .filter(categories::Column::UserId.is_in(owners))
                    .all(&db_tx)
                    .await?,
                sub_categories: sub_categories::Entity::find()
                    .filter(sub_categories::Column::UserId.is_in(owners))
                    .all(&db_tx)
                    .await?,
                wallets: wallets::Entity::find()
                    .filter(wallets::Column::UserId.eq(user_id))
                    .all(&db_tx)
                    .await?,
            };

            let mut errors = Vec::new();
            let mut pending = Vec::new();
            for row in parse_uplanner(body) {
                match row.and_then(|row| names.resolve(&row)) {
                    Ok(movement) => pending.push(movement),
                    Err(err) => errors.push(err),
                }
            }

            if !errors.is_empty() {
                for err in &errors {
                    tracing::warn!("uplanner import for {user_id}: {err}");
                }
                return Err(EngineError::Import(errors));
            }
            if pending.is_empty() {
                return Err(EngineError::Validation("no rows to import".to_string()));
            }

            let mut summary = ImportSummary::default();
            for movement in pending {
                let movement = self.insert_movement(&db_tx, movement, user_id).await?;
                summary.imported += 1;
                match movement.status {
                    MovementStatus::Paid => summary.paid += 1,
                    MovementStatus::Planned => summary.planned += 1,
                }
            }
            tracing::info!(
                "uplanner import for {user_id}: {} movements ({} paid)",
                summary.imported,
                summary.paid
            );
            summary
        })
    }
}
