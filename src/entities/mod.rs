//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod budget;
pub mod category;
pub mod posting;
pub mod savings_bucket;
pub mod transaction;
pub mod wallet;

// Re-export specific types to avoid conflicts
pub use budget::{Column as BudgetColumn, Entity as Budget, Model as BudgetModel};
pub use category::{
    CategoryType, Column as CategoryColumn, Entity as Category, Model as CategoryModel,
};
pub use posting::{Column as PostingColumn, Entity as Posting, Model as PostingModel};
pub use savings_bucket::{
    Column as SavingsBucketColumn, Entity as SavingsBucket, Model as SavingsBucketModel,
};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
    TransactionType,
};
pub use wallet::{Column as WalletColumn, Entity as Wallet, Model as WalletModel};
