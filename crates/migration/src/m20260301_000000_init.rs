//! Initial schema migration - creates all tables from scratch.
//!
//! - `users`: credentials for Basic auth and session login
//! - `wallets`: accounts holding a running balance
//! - `categories` / `sub_categories`: two-level labels, `user_id = 'default'`
//!   rows are shared
//! - `type_payments`: how a movement was paid
//! - `movements`: every financial entry; `transaction_id` groups realized
//!   movements under their estimate

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum Wallets {
    Table,
    Id,
    Description,
    Balance,
    UserId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Description,
    UserId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum SubCategories {
    Table,
    Id,
    Description,
    CategoryId,
    UserId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum TypePayments {
    Table,
    Id,
    Description,
    UserId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Movements {
    Table,
    Id,
    Description,
    Amount,
    Date,
    WalletId,
    TypePaymentId,
    CategoryId,
    SubCategoryId,
    Status,
    TransactionId,
    UserId,
    CreatedAt,
    UpdatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Wallets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Wallets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Wallets::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Wallets::Description).string().not_null())
                    .col(
                        ColumnDef::new(Wallets::Balance)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Wallets::UserId).string().not_null())
                    .col(
                        ColumnDef::new(Wallets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Wallets::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-wallets-user_id")
                    .table(Wallets::Table)
                    .col(Wallets::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Description).string().not_null())
                    .col(ColumnDef::new(Categories::UserId).string().not_null())
                    .col(
                        ColumnDef::new(Categories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Categories::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-user_id")
                    .table(Categories::Table)
                    .col(Categories::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Sub-categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(SubCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubCategories::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SubCategories::Description)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SubCategories::CategoryId).blob().not_null())
                    .col(ColumnDef::new(SubCategories::UserId).string().not_null())
                    .col(
                        ColumnDef::new(SubCategories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubCategories::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sub_categories-category_id")
                            .from(SubCategories::Table, SubCategories::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-sub_categories-category_id")
                    .table(SubCategories::Table)
                    .col(SubCategories::CategoryId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Type payments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(TypePayments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TypePayments::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TypePayments::Description)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TypePayments::UserId).string().not_null())
                    .col(
                        ColumnDef::new(TypePayments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TypePayments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Movements
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Movements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Movements::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Movements::Description).string().not_null())
                    .col(ColumnDef::new(Movements::Amount).double().not_null())
                    .col(ColumnDef::new(Movements::Date).date().not_null())
                    .col(ColumnDef::new(Movements::WalletId).blob().not_null())
                    .col(ColumnDef::new(Movements::TypePaymentId).blob())
                    .col(ColumnDef::new(Movements::CategoryId).blob())
                    .col(ColumnDef::new(Movements::SubCategoryId).blob())
                    .col(ColumnDef::new(Movements::Status).string().not_null())
                    .col(ColumnDef::new(Movements::TransactionId).blob())
                    .col(ColumnDef::new(Movements::UserId).string().not_null())
                    .col(
                        ColumnDef::new(Movements::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Movements::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-movements-wallet_id")
                            .from(Movements::Table, Movements::WalletId)
                            .to(Wallets::Table, Wallets::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-movements-type_payment_id")
                            .from(Movements::Table, Movements::TypePaymentId)
                            .to(TypePayments::Table, TypePayments::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-movements-category_id")
                            .from(Movements::Table, Movements::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-movements-sub_category_id")
                            .from(Movements::Table, Movements::SubCategoryId)
                            .to(SubCategories::Table, SubCategories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-movements-user_id-date")
                    .table(Movements::Table)
                    .col(Movements::UserId)
                    .col(Movements::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-movements-transaction_id")
                    .table(Movements::Table)
                    .col(Movements::TransactionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Movements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TypePayments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SubCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Wallets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
