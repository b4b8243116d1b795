use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a movement already happened or is only expected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementStatus {
    Paid,
    Planned,
}

/// Query string shared by every period-scoped read.
///
/// Dates are kept as raw strings so a malformed value is reported by the
/// handler as a 400 instead of an extractor rejection.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PeriodQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub status: Option<MovementStatus>,
}

pub mod session {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Login {
        pub username: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LoginResponse {
        pub token: String,
        pub expires_at: DateTime<Utc>,
    }
}

pub mod wallet {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletNew {
        pub description: String,
        #[serde(default)]
        pub balance: f64,
    }

    /// Every present field overwrites the stored value.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct WalletUpdate {
        pub description: Option<String>,
        pub balance: Option<f64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WalletView {
        pub id: Uuid,
        pub description: String,
        pub balance: f64,
        pub user_id: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub description: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryView {
        pub id: Uuid,
        pub description: String,
        pub user_id: String,
        pub sub_categories: Vec<SubCategoryView>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SubCategoryNew {
        pub description: String,
        pub category_id: Uuid,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SubCategoryUpdate {
        pub description: Option<String>,
        pub category_id: Option<Uuid>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SubCategoryList {
        pub category_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SubCategoryView {
        pub id: Uuid,
        pub description: String,
        pub category_id: Uuid,
        pub user_id: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod type_payment {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TypePaymentNew {
        pub description: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TypePaymentUpdate {
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TypePaymentView {
        pub id: Uuid,
        pub description: String,
        pub user_id: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod movement {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MovementNew {
        pub description: String,
        pub amount: f64,
        /// `YYYY-MM-DD`.
        pub date: NaiveDate,
        pub wallet_id: Uuid,
        pub type_payment_id: Option<Uuid>,
        pub category_id: Option<Uuid>,
        pub sub_category_id: Option<Uuid>,
        pub status: MovementStatus,
        /// Group root. When absent the movement is its own root.
        pub transaction_id: Option<Uuid>,
    }

    /// Every present field overwrites the stored value.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MovementUpdate {
        pub description: Option<String>,
        pub amount: Option<f64>,
        pub date: Option<NaiveDate>,
        pub wallet_id: Option<Uuid>,
        pub type_payment_id: Option<Uuid>,
        pub category_id: Option<Uuid>,
        pub sub_category_id: Option<Uuid>,
        pub status: Option<MovementStatus>,
        pub transaction_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MovementView {
        pub id: Uuid,
        pub description: String,
        pub amount: f64,
        pub date: NaiveDate,
        pub wallet_id: Uuid,
        pub type_payment_id: Option<Uuid>,
        pub category_id: Option<Uuid>,
        pub sub_category_id: Option<Uuid>,
        pub status: MovementStatus,
        pub transaction_id: Option<Uuid>,
        pub user_id: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod transaction {
    use super::*;
    use movement::{MovementNew, MovementView};

    /// An estimate plus the movements already realized against it.
    ///
    /// Realized entries are always stored as `paid` and grouped under the
    /// estimate, whatever their `status`/`transactionId` say.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub estimate: MovementNew,
        #[serde(default)]
        pub realized: Vec<MovementNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Consolidation {
        pub estimated: f64,
        pub realized: f64,
        pub remaining: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub estimate: Option<MovementView>,
        pub movements: Vec<MovementView>,
        pub consolidation: Consolidation,
    }
}

pub mod balance {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    /// Unset bounds are `null`.
    pub struct PeriodView {
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Balance {
        pub period: PeriodView,
        pub income: f64,
        pub expense: f64,
    }
}

pub mod import {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ImportSummary {
        pub imported: usize,
        pub paid: usize,
        pub planned: usize,
    }
}
