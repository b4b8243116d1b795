pub use balance::Balance;
pub use categories::Category;
pub use error::EngineError;
pub use import::{UplannerRow, parse_uplanner};
pub use movements::{Movement, MovementStatus};
pub use ops::{Engine, EngineBuilder, ImportSummary, MovementNew, MovementPatch, TransactionNew};
pub use period::Period;
pub use sub_categories::SubCategory;
pub use transactions::{Consolidation, TransactionView};
pub use type_payments::TypePayment;
pub use wallets::Wallet;

pub mod categories;
pub mod movements;
pub mod sub_categories;
pub mod type_payments;
pub mod users;
pub mod wallets;

mod balance;
mod error;
mod import;
mod ops;
mod period;
mod transactions;

type ResultEngine<T> = Result<T, EngineError>;

/// Owner id of the categories and sub-categories shared with every user.
pub const DEFAULT_OWNER: &str = "default";
