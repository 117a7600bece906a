use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::store::{CatalogKind, Favorite, FavoriteTarget, NewFavorite};

/// Body for `POST /favorites`. Exactly one of `people_id` / `planet_id` must be set.
#[derive(Debug, Deserialize)]
pub struct FavoriteRequest {
    pub user_id: i32,
    pub people_id: Option<i32>,
    pub planet_id: Option<i32>,
}

impl FavoriteRequest {
    pub fn into_new(self) -> AppResult<NewFavorite> {
        let target = FavoriteTarget::from_columns(self.people_id, self.planet_id).ok_or_else(
            || AppError::Validation("exactly one of people_id or planet_id is required".into()),
        )?;
        Ok(NewFavorite {
            user_id: self.user_id,
            target,
        })
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SubjectView {
    People { uid: String, name: String },
    Planet { uid: String, name: String },
    Unknown,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct FavoriteResponse {
    pub id: i32,
    pub user_id: i32,
    #[serde(flatten)]
    pub subject: SubjectView,
}

impl From<Favorite> for FavoriteResponse {
    fn from(f: Favorite) -> Self {
        let subject = match f.subject {
            Some(s) => match s.kind {
                CatalogKind::People => SubjectView::People {
                    uid: s.uid,
                    name: s.name,
                },
                CatalogKind::Planet => SubjectView::Planet {
                    uid: s.uid,
                    name: s.name,
                },
            },
            None => SubjectView::Unknown,
        };
        Self {
            id: f.id,
            user_id: f.user_id,
            subject,
        }
    }
}
