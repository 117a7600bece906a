use std::collections::BTreeMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::{
    CatalogFields, CatalogItem, CatalogKind, EntityStore, Favorite, FavoriteTarget, NewFavorite,
    StoreError, StoreResult, Subject, User, UserFields, FAVORITE_USER_FKEY, USER_EMAIL_KEY,
};

/// In-process store with the same constraints and cascades as the Postgres schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

struct Table<T> {
    rows: BTreeMap<i32, T>,
    last_id: i32,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    // Ids are never reused, like a SERIAL sequence.
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Debug, Clone)]
struct FavoriteRecord {
    id: i32,
    user_id: i32,
    target: FavoriteTarget,
    created_at: OffsetDateTime,
}

#[derive(Default)]
struct Tables {
    users: Table<User>,
    people: Table<CatalogItem>,
    planets: Table<CatalogItem>,
    favorites: Table<FavoriteRecord>,
}

impl Tables {
    fn catalog(&self, kind: CatalogKind) -> &Table<CatalogItem> {
        match kind {
            CatalogKind::People => &self.people,
            CatalogKind::Planet => &self.planets,
        }
    }

    fn catalog_mut(&mut self, kind: CatalogKind) -> &mut Table<CatalogItem> {
        match kind {
            CatalogKind::People => &mut self.people,
            CatalogKind::Planet => &mut self.planets,
        }
    }

    fn email_taken(&self, email: &str, except: Option<i32>) -> bool {
        self.users
            .rows
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn uid_taken(&self, kind: CatalogKind, uid: &str, except: Option<i32>) -> bool {
        self.catalog(kind)
            .rows
            .values()
            .any(|e| e.uid == uid && Some(e.id) != except)
    }

    fn resolve(&self, record: &FavoriteRecord) -> Favorite {
        let kind = record.target.kind();
        let subject = self
            .catalog(kind)
            .rows
            .get(&record.target.id())
            .map(|entry| Subject {
                kind,
                uid: entry.uid.clone(),
                name: entry.name.clone(),
            });
        Favorite {
            id: record.id,
            user_id: record.user_id,
            target: Some(record.target),
            subject,
            created_at: record.created_at,
        }
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn create_user(&self, fields: UserFields) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        if t.email_taken(&fields.email, None) {
            return Err(StoreError::Duplicate {
                constraint: USER_EMAIL_KEY.into(),
            });
        }
        let id = t.users.next_id();
        let user = User {
            id,
            email: fields.email,
            password: fields.password,
            is_active: fields.is_active,
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.rows.insert(id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: i32) -> StoreResult<User> {
        let t = self.tables.read().await;
        t.users
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("user", id))
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let t = self.tables.read().await;
        Ok(t.users.rows.values().cloned().collect())
    }

    async fn update_user(&self, id: i32, fields: UserFields) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        if !t.users.rows.contains_key(&id) {
            return Err(StoreError::not_found("user", id));
        }
        if t.email_taken(&fields.email, Some(id)) {
            return Err(StoreError::Duplicate {
                constraint: USER_EMAIL_KEY.into(),
            });
        }
        let user = t
            .users
            .rows
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("user", id))?;
        user.email = fields.email;
        user.password = fields.password;
        user.is_active = fields.is_active;
        Ok(user.clone())
    }

    async fn delete_user(&self, id: i32) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        if t.users.rows.remove(&id).is_none() {
            return Err(StoreError::not_found("user", id));
        }
        t.favorites.rows.retain(|_, f| f.user_id != id);
        Ok(())
    }

    async fn create_entry(
        &self,
        kind: CatalogKind,
        fields: CatalogFields,
    ) -> StoreResult<CatalogItem> {
        let mut t = self.tables.write().await;
        if t.uid_taken(kind, &fields.uid, None) {
            return Err(StoreError::Duplicate {
                constraint: kind.uid_constraint().into(),
            });
        }
        let table = t.catalog_mut(kind);
        let id = table.next_id();
        let item = CatalogItem {
            id,
            uid: fields.uid,
            name: fields.name,
        };
        table.rows.insert(id, item.clone());
        Ok(item)
    }

    async fn get_entry(&self, kind: CatalogKind, id: i32) -> StoreResult<CatalogItem> {
        let t = self.tables.read().await;
        t.catalog(kind)
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(kind.table(), id))
    }

    async fn list_entries(&self, kind: CatalogKind) -> StoreResult<Vec<CatalogItem>> {
        let t = self.tables.read().await;
        Ok(t.catalog(kind).rows.values().cloned().collect())
    }

    async fn update_entry(
        &self,
        kind: CatalogKind,
        id: i32,
        fields: CatalogFields,
    ) -> StoreResult<CatalogItem> {
        let mut t = self.tables.write().await;
        if !t.catalog(kind).rows.contains_key(&id) {
            return Err(StoreError::not_found(kind.table(), id));
        }
        if t.uid_taken(kind, &fields.uid, Some(id)) {
            return Err(StoreError::Duplicate {
                constraint: kind.uid_constraint().into(),
            });
        }
        let item = t
            .catalog_mut(kind)
            .rows
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(kind.table(), id))?;
        item.uid = fields.uid;
        item.name = fields.name;
        Ok(item.clone())
    }

    async fn delete_entry(&self, kind: CatalogKind, id: i32) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        if t.catalog_mut(kind).rows.remove(&id).is_none() {
            return Err(StoreError::not_found(kind.table(), id));
        }
        t.favorites
            .rows
            .retain(|_, f| !(f.target.kind() == kind && f.target.id() == id));
        Ok(())
    }

    async fn create_favorite(&self, new: NewFavorite) -> StoreResult<Favorite> {
        let mut t = self.tables.write().await;
        if !t.users.rows.contains_key(&new.user_id) {
            return Err(StoreError::ForeignKey {
                constraint: FAVORITE_USER_FKEY.into(),
            });
        }
        let kind = new.target.kind();
        if !t.catalog(kind).rows.contains_key(&new.target.id()) {
            return Err(StoreError::ForeignKey {
                constraint: kind.foreign_key().into(),
            });
        }
        let duplicate = t
            .favorites
            .rows
            .values()
            .any(|f| f.user_id == new.user_id && f.target == new.target);
        if duplicate {
            return Err(StoreError::Duplicate {
                constraint: kind.favorite_constraint().into(),
            });
        }
        let id = t.favorites.next_id();
        let record = FavoriteRecord {
            id,
            user_id: new.user_id,
            target: new.target,
            created_at: OffsetDateTime::now_utc(),
        };
        let favorite = t.resolve(&record);
        t.favorites.rows.insert(id, record);
        Ok(favorite)
    }

    async fn get_favorite(&self, id: i32) -> StoreResult<Favorite> {
        let t = self.tables.read().await;
        t.favorites
            .rows
            .get(&id)
            .map(|r| t.resolve(r))
            .ok_or_else(|| StoreError::not_found("favorite", id))
    }

    async fn list_favorites(&self) -> StoreResult<Vec<Favorite>> {
        let t = self.tables.read().await;
        Ok(t.favorites.rows.values().map(|r| t.resolve(r)).collect())
    }

    async fn list_user_favorites(&self, user_id: i32) -> StoreResult<Vec<Favorite>> {
        let t = self.tables.read().await;
        if !t.users.rows.contains_key(&user_id) {
            return Err(StoreError::not_found("user", user_id));
        }
        Ok(t
            .favorites
            .rows
            .values()
            .filter(|r| r.user_id == user_id)
            .map(|r| t.resolve(r))
            .collect())
    }

    async fn delete_favorite(&self, id: i32) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        t.favorites
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("favorite", id))
    }

    async fn delete_favorite_for(&self, user_id: i32, target: FavoriteTarget) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        let before = t.favorites.rows.len();
        t.favorites
            .rows
            .retain(|_, f| !(f.user_id == user_id && f.target == target));
        if t.favorites.rows.len() == before {
            return Err(StoreError::not_found("favorite", target.id()));
        }
        Ok(())
    }
}
