//! Entity storage for users, catalog entries (people / planets) and favorites.
//!
//! Both backends enforce the same constraints and report violations with the
//! constraint names used by `migrations/0001_init.sql`.

use async_trait::async_trait;
use thiserror::Error;

mod memory;
pub mod models;
mod postgres;

pub use memory::MemoryStore;
pub use models::{
    CatalogFields, CatalogItem, CatalogKind, Favorite, FavoriteTarget, NewFavorite, Subject,
    User, UserFields,
};
pub use postgres::PgStore;

pub const USER_EMAIL_KEY: &str = "user_email_key";
pub const FAVORITE_USER_FKEY: &str = "favorite_user_id_fkey";

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("duplicate key value violates unique constraint \"{constraint}\"")]
    Duplicate { constraint: String },

    #[error("reference violates foreign key constraint \"{constraint}\"")]
    ForeignKey { constraint: String },

    #[error("row violates check constraint \"{constraint}\"")]
    Check { constraint: String },

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, id: i32) -> Self {
        StoreError::NotFound { entity, id }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            let constraint = db.constraint().unwrap_or("unknown").to_string();
            if db.is_unique_violation() {
                return StoreError::Duplicate { constraint };
            }
            if db.is_foreign_key_violation() {
                return StoreError::ForeignKey { constraint };
            }
            if db.is_check_violation() {
                return StoreError::Check { constraint };
            }
        }
        StoreError::Database(err)
    }
}

#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn create_user(&self, fields: UserFields) -> StoreResult<User>;
    async fn get_user(&self, id: i32) -> StoreResult<User>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn update_user(&self, id: i32, fields: UserFields) -> StoreResult<User>;
    /// Removes the user and every favorite it owns.
    async fn delete_user(&self, id: i32) -> StoreResult<()>;

    async fn create_entry(&self, kind: CatalogKind, fields: CatalogFields)
        -> StoreResult<CatalogItem>;
    async fn get_entry(&self, kind: CatalogKind, id: i32) -> StoreResult<CatalogItem>;
    async fn list_entries(&self, kind: CatalogKind) -> StoreResult<Vec<CatalogItem>>;
    async fn update_entry(
        &self,
        kind: CatalogKind,
        id: i32,
        fields: CatalogFields,
    ) -> StoreResult<CatalogItem>;
    /// Removes the entry and every favorite that references it.
    async fn delete_entry(&self, kind: CatalogKind, id: i32) -> StoreResult<()>;

    async fn create_favorite(&self, new: NewFavorite) -> StoreResult<Favorite>;
    async fn get_favorite(&self, id: i32) -> StoreResult<Favorite>;
    async fn list_favorites(&self) -> StoreResult<Vec<Favorite>>;
    async fn list_user_favorites(&self, user_id: i32) -> StoreResult<Vec<Favorite>>;
    async fn delete_favorite(&self, id: i32) -> StoreResult<()>;
    async fn delete_favorite_for(&self, user_id: i32, target: FavoriteTarget)
        -> StoreResult<()>;
}
