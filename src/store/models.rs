use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    /// Argon2 PHC string, never the plain credential.
    pub password: String,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
}

/// Full-record payload for user inserts and updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFields {
    pub email: String,
    pub password: String,
    pub is_active: bool,
}

/// People and planets share one shape and live in separate tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    People,
    Planet,
}

impl CatalogKind {
    pub fn table(self) -> &'static str {
        match self {
            CatalogKind::People => "people",
            CatalogKind::Planet => "planet",
        }
    }

    pub fn uid_constraint(self) -> &'static str {
        match self {
            CatalogKind::People => "people_uid_key",
            CatalogKind::Planet => "planet_uid_key",
        }
    }

    pub fn favorite_constraint(self) -> &'static str {
        match self {
            CatalogKind::People => "uq_user_people_fav",
            CatalogKind::Planet => "uq_user_planet_fav",
        }
    }

    pub fn foreign_key(self) -> &'static str {
        match self {
            CatalogKind::People => "favorite_people_id_fkey",
            CatalogKind::Planet => "favorite_planet_id_fkey",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CatalogItem {
    pub id: i32,
    pub uid: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFields {
    pub uid: String,
    pub name: String,
}

/// What a favorite points at. Exactly one of the two references is ever set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FavoriteTarget {
    People(i32),
    Planet(i32),
}

impl FavoriteTarget {
    pub fn kind(self) -> CatalogKind {
        match self {
            FavoriteTarget::People(_) => CatalogKind::People,
            FavoriteTarget::Planet(_) => CatalogKind::Planet,
        }
    }

    pub fn id(self) -> i32 {
        match self {
            FavoriteTarget::People(id) | FavoriteTarget::Planet(id) => id,
        }
    }

    /// Rebuilds the target from the nullable `people_id` / `planet_id` columns.
    pub fn from_columns(people_id: Option<i32>, planet_id: Option<i32>) -> Option<Self> {
        match (people_id, planet_id) {
            (Some(id), None) => Some(FavoriteTarget::People(id)),
            (None, Some(id)) => Some(FavoriteTarget::Planet(id)),
            _ => None,
        }
    }

    pub fn people_id(self) -> Option<i32> {
        match self {
            FavoriteTarget::People(id) => Some(id),
            FavoriteTarget::Planet(_) => None,
        }
    }

    pub fn planet_id(self) -> Option<i32> {
        match self {
            FavoriteTarget::Planet(id) => Some(id),
            FavoriteTarget::People(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewFavorite {
    pub user_id: i32,
    pub target: FavoriteTarget,
}

/// The catalog entry a favorite resolves to at read time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub kind: CatalogKind,
    pub uid: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Favorite {
    pub id: i32,
    pub user_id: i32,
    pub target: Option<FavoriteTarget>,
    pub subject: Option<Subject>,
    pub created_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_from_columns_requires_exactly_one_reference() {
        assert_eq!(
            FavoriteTarget::from_columns(Some(3), None),
            Some(FavoriteTarget::People(3))
        );
        assert_eq!(
            FavoriteTarget::from_columns(None, Some(7)),
            Some(FavoriteTarget::Planet(7))
        );
        assert_eq!(FavoriteTarget::from_columns(None, None), None);
        assert_eq!(FavoriteTarget::from_columns(Some(1), Some(2)), None);
    }

    #[test]
    fn target_splits_back_into_columns() {
        let t = FavoriteTarget::Planet(9);
        assert_eq!(t.people_id(), None);
        assert_eq!(t.planet_id(), Some(9));
        assert_eq!(t.kind(), CatalogKind::Planet);
        assert_eq!(t.id(), 9);
    }
}
