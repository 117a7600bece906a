use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::store::{CatalogFields, CatalogItem};
use crate::validate::{required_text, NAME_MAX, UID_MAX};

#[derive(Debug, Deserialize)]
pub struct EntryRequest {
    pub uid: String,
    pub name: String,
}

impl EntryRequest {
    pub fn into_fields(self) -> AppResult<CatalogFields> {
        Ok(CatalogFields {
            uid: required_text("uid", &self.uid, UID_MAX)?,
            name: required_text("name", &self.name, NAME_MAX)?,
        })
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct EntryResponse {
    pub id: i32,
    pub uid: String,
    pub name: String,
}

impl From<CatalogItem> for EntryResponse {
    fn from(e: CatalogItem) -> Self {
        Self {
            id: e.id,
            uid: e.uid,
            name: e.name,
        }
    }
}
