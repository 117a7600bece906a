use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use time::OffsetDateTime;
use tracing::{debug, info};

use super::{
    CatalogFields, CatalogItem, CatalogKind, EntityStore, Favorite, FavoriteTarget, NewFavorite,
    StoreError, StoreResult, Subject, User, UserFields,
};

const FAVORITE_SELECT: &str = r#"
    SELECT f.id, f.user_id, f.people_id, f.planet_id, f.created_at,
           p.uid AS people_uid, p.name AS people_name,
           pl.uid AS planet_uid, pl.name AS planet_name
      FROM favorite f
      LEFT JOIN people p ON p.id = f.people_id
      LEFT JOIN planet pl ON pl.id = f.planet_id
"#;

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    /// Connects the pool and applies the embedded migrations.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;
        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("run migrations")?;
        info!("database ready");
        Ok(Self { db })
    }
}

#[derive(Debug, FromRow)]
struct FavoriteRow {
    id: i32,
    user_id: i32,
    people_id: Option<i32>,
    planet_id: Option<i32>,
    created_at: OffsetDateTime,
    people_uid: Option<String>,
    people_name: Option<String>,
    planet_uid: Option<String>,
    planet_name: Option<String>,
}

impl From<FavoriteRow> for Favorite {
    fn from(r: FavoriteRow) -> Self {
        let subject = match (r.people_uid, r.people_name, r.planet_uid, r.planet_name) {
            (Some(uid), Some(name), _, _) => Some(Subject {
                kind: CatalogKind::People,
                uid,
                name,
            }),
            (_, _, Some(uid), Some(name)) => Some(Subject {
                kind: CatalogKind::Planet,
                uid,
                name,
            }),
            _ => None,
        };
        Self {
            id: r.id,
            user_id: r.user_id,
            target: FavoriteTarget::from_columns(r.people_id, r.planet_id),
            subject,
            created_at: r.created_at,
        }
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn create_user(&self, fields: UserFields) -> StoreResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO "user" (email, password, is_active)
            VALUES ($1, $2, $3)
            RETURNING id, email, password, is_active, created_at
            "#,
        )
        .bind(&fields.email)
        .bind(&fields.password)
        .bind(fields.is_active)
        .fetch_one(&self.db)
        .await?;
        debug!(user_id = user.id, "user inserted");
        Ok(user)
    }

    async fn get_user(&self, id: i32) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            r#"SELECT id, email, password, is_active, created_at FROM "user" WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| StoreError::not_found("user", id))
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            r#"SELECT id, email, password, is_active, created_at FROM "user" ORDER BY id"#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn update_user(&self, id: i32, fields: UserFields) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE "user"
               SET email = $2, password = $3, is_active = $4
             WHERE id = $1
            RETURNING id, email, password, is_active, created_at
            "#,
        )
        .bind(id)
        .bind(&fields.email)
        .bind(&fields.password)
        .bind(fields.is_active)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| StoreError::not_found("user", id))
    }

    async fn delete_user(&self, id: i32) -> StoreResult<()> {
        let res = sqlx::query(r#"DELETE FROM "user" WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::not_found("user", id));
        }
        Ok(())
    }

    async fn create_entry(
        &self,
        kind: CatalogKind,
        fields: CatalogFields,
    ) -> StoreResult<CatalogItem> {
        let sql = format!(
            "INSERT INTO {} (uid, name) VALUES ($1, $2) RETURNING id, uid, name",
            kind.table()
        );
        let item = sqlx::query_as::<_, CatalogItem>(&sql)
            .bind(&fields.uid)
            .bind(&fields.name)
            .fetch_one(&self.db)
            .await?;
        Ok(item)
    }

    async fn get_entry(&self, kind: CatalogKind, id: i32) -> StoreResult<CatalogItem> {
        let sql = format!("SELECT id, uid, name FROM {} WHERE id = $1", kind.table());
        sqlx::query_as::<_, CatalogItem>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| StoreError::not_found(kind.table(), id))
    }

    async fn list_entries(&self, kind: CatalogKind) -> StoreResult<Vec<CatalogItem>> {
        let sql = format!("SELECT id, uid, name FROM {} ORDER BY id", kind.table());
        let rows = sqlx::query_as::<_, CatalogItem>(&sql)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn update_entry(
        &self,
        kind: CatalogKind,
        id: i32,
        fields: CatalogFields,
    ) -> StoreResult<CatalogItem> {
        let sql = format!(
            "UPDATE {} SET uid = $2, name = $3 WHERE id = $1 RETURNING id, uid, name",
            kind.table()
        );
        sqlx::query_as::<_, CatalogItem>(&sql)
            .bind(id)
            .bind(&fields.uid)
            .bind(&fields.name)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| StoreError::not_found(kind.table(), id))
    }

    async fn delete_entry(&self, kind: CatalogKind, id: i32) -> StoreResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());
        let res = sqlx::query(&sql).bind(id).execute(&self.db).await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::not_found(kind.table(), id));
        }
        Ok(())
    }

    async fn create_favorite(&self, new: NewFavorite) -> StoreResult<Favorite> {
        let row = sqlx::query_as::<_, FavoriteRow>(
            r#"
            WITH f AS (
                INSERT INTO favorite (user_id, people_id, planet_id)
                VALUES ($1, $2, $3)
                RETURNING id, user_id, people_id, planet_id, created_at
            )
            SELECT f.id, f.user_id, f.people_id, f.planet_id, f.created_at,
                   p.uid AS people_uid, p.name AS people_name,
                   pl.uid AS planet_uid, pl.name AS planet_name
              FROM f
              LEFT JOIN people p ON p.id = f.people_id
              LEFT JOIN planet pl ON pl.id = f.planet_id
            "#,
        )
        .bind(new.user_id)
        .bind(new.target.people_id())
        .bind(new.target.planet_id())
        .fetch_one(&self.db)
        .await?;
        debug!(favorite_id = row.id, user_id = new.user_id, "favorite inserted");
        Ok(row.into())
    }

    async fn get_favorite(&self, id: i32) -> StoreResult<Favorite> {
        let sql = format!("{FAVORITE_SELECT} WHERE f.id = $1");
        sqlx::query_as::<_, FavoriteRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .map(Favorite::from)
            .ok_or_else(|| StoreError::not_found("favorite", id))
    }

    async fn list_favorites(&self) -> StoreResult<Vec<Favorite>> {
        let sql = format!("{FAVORITE_SELECT} ORDER BY f.id");
        let rows = sqlx::query_as::<_, FavoriteRow>(&sql)
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Favorite::from).collect())
    }

    async fn list_user_favorites(&self, user_id: i32) -> StoreResult<Vec<Favorite>> {
        self.get_user(user_id).await?;
        let sql = format!("{FAVORITE_SELECT} WHERE f.user_id = $1 ORDER BY f.id");
        let rows = sqlx::query_as::<_, FavoriteRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Favorite::from).collect())
    }

    async fn delete_favorite(&self, id: i32) -> StoreResult<()> {
        let res = sqlx::query("DELETE FROM favorite WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::not_found("favorite", id));
        }
        Ok(())
    }

    async fn delete_favorite_for(&self, user_id: i32, target: FavoriteTarget) -> StoreResult<()> {
        let sql = match target {
            FavoriteTarget::People(_) => {
                "DELETE FROM favorite WHERE user_id = $1 AND people_id = $2"
            }
            FavoriteTarget::Planet(_) => {
                "DELETE FROM favorite WHERE user_id = $1 AND planet_id = $2"
            }
        };
        let res = sqlx::query(sql)
            .bind(user_id)
            .bind(target.id())
            .execute(&self.db)
            .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::not_found("favorite", target.id()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> FavoriteRow {
        FavoriteRow {
            id: 1,
            user_id: 2,
            people_id: None,
            planet_id: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            people_uid: None,
            people_name: None,
            planet_uid: None,
            planet_name: None,
        }
    }

    #[test]
    fn joined_people_row_resolves_subject() {
        let fav: Favorite = FavoriteRow {
            people_id: Some(5),
            people_uid: Some("1".into()),
            people_name: Some("Luke Skywalker".into()),
            ..row()
        }
        .into();
        assert_eq!(fav.target, Some(FavoriteTarget::People(5)));
        let subject = fav.subject.expect("subject");
        assert_eq!(subject.kind, CatalogKind::People);
        assert_eq!(subject.name, "Luke Skywalker");
    }

    #[test]
    fn joined_planet_row_resolves_subject() {
        let fav: Favorite = FavoriteRow {
            planet_id: Some(3),
            planet_uid: Some("1".into()),
            planet_name: Some("Tatooine".into()),
            ..row()
        }
        .into();
        assert_eq!(fav.target, Some(FavoriteTarget::Planet(3)));
        assert_eq!(fav.subject.map(|s| s.kind), Some(CatalogKind::Planet));
    }

    #[test]
    fn row_without_references_has_no_subject() {
        let fav: Favorite = row().into();
        assert_eq!(fav.target, None);
        assert_eq!(fav.subject, None);
    }
}
