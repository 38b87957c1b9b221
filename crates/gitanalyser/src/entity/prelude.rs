//! Common re-exports for convenient entity usage.

pub use super::auth_provider::AuthProvider;
pub use super::saved_repository::{
    ActiveModel as SavedRepositoryActiveModel, Column as SavedRepositoryColumn,
    Entity as SavedRepository, Model as SavedRepositoryModel,
};
pub use super::user_account::{
    ActiveModel as UserAccountActiveModel, Column as UserAccountColumn, Entity as UserAccount,
    Model as UserAccountModel,
};
