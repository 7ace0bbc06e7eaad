//! # User Repository
//!
//! Cache operations for user profiles.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use bazaar_core::User;

use crate::entity::{UserRow, USER_COLUMNS};
use crate::error::{DbError, DbResult};
use crate::filter::UserFilter;
use crate::notify::{ChangeNotifier, Table};
use crate::ObserveStream;
use crate::repository::observe_table;

const UPSERT_SQL: &str = r#"
    INSERT INTO users (
        id, email, display_name, phone, role, photo_url, addresses,
        is_active, created_at, updated_at, cached_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
    ON CONFLICT(id) DO UPDATE SET
        email = excluded.email,
        display_name = excluded.display_name,
        phone = excluded.phone,
        role = excluded.role,
        photo_url = excluded.photo_url,
        addresses = excluded.addresses,
        is_active = excluded.is_active,
        created_at = excluded.created_at,
        updated_at = excluded.updated_at,
        cached_at = excluded.cached_at
"#;

/// Repository for cached user profiles.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
    changes: ChangeNotifier,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool, changes: ChangeNotifier) -> Self {
        UserRepository { pool, changes }
    }

    /// Inserts or replaces a batch by id inside one transaction.
    pub async fn upsert_all(&self, users: &[User]) -> DbResult<usize> {
        if users.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        for user in users {
            let row = UserRow::from(user);
            sqlx::query(UPSERT_SQL)
                .bind(&row.id)
                .bind(&row.email)
                .bind(&row.display_name)
                .bind(&row.phone)
                .bind(&row.role)
                .bind(&row.photo_url)
                .bind(&row.addresses)
                .bind(row.is_active)
                .bind(&row.created_at)
                .bind(&row.updated_at)
                .bind(row.cached_at)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await.map_err(DbError::transaction)?;
        self.changes.notify(Table::Users);

        debug!(count = users.len(), "Upserted users");
        Ok(users.len())
    }

    pub async fn upsert(&self, user: &User) -> DbResult<()> {
        self.upsert_all(std::slice::from_ref(user)).await?;
        Ok(())
    }

    pub async fn query(&self, filter: &UserFilter) -> DbResult<Vec<User>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {USER_COLUMNS} FROM users"));
        filter.push_sql(&mut qb);

        let rows = qb.build_query_as::<UserRow>().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    pub fn observe(&self, filter: UserFilter) -> ObserveStream<User> {
        let repo = self.clone();
        observe_table(&self.changes, Table::Users, move || {
            let repo = repo.clone();
            let filter = filter.clone();
            async move { repo.query(&filter).await }
        })
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn delete_by_id(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            self.changes.notify(Table::Users);
        }
        Ok(removed)
    }

    pub async fn clear(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM users")
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected();
        if removed > 0 {
            self.changes.notify(Table::Users);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use bazaar_core::{Address, UserRole};
    use futures_util::StreamExt;
    use std::time::Duration;
    use tokio::time::timeout;

    fn user(id: &str, name: &str, role: UserRole) -> User {
        User {
            id: id.into(),
            email: format!("{id}@example.com"),
            display_name: name.into(),
            phone: String::new(),
            role,
            photo_url: String::new(),
            addresses: vec![Address {
                city: "Karachi".into(),
                ..Default::default()
            }],
            is_active: true,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[tokio::test]
    async fn test_role_filter_and_observe() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.users();
        let mut sellers = repo.observe(UserFilter::ByRole(UserRole::Seller));

        let first = timeout(Duration::from_secs(5), sellers.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert!(first.is_empty());

        repo.upsert_all(&[
            user("u-1", "Zara", UserRole::Seller),
            user("u-2", "Ali", UserRole::Customer),
            user("u-3", "Bilal", UserRole::Seller),
        ])
        .await
        .unwrap();

        let emitted = timeout(Duration::from_secs(5), sellers.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let names: Vec<_> = emitted.iter().map(|u| u.display_name.as_str()).collect();
        assert_eq!(names, vec!["Bilal", "Zara"]);
        assert_eq!(emitted[0].addresses[0].city, "Karachi");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.users();
        repo.upsert(&user("u-1", "Ali", UserRole::Admin)).await.unwrap();

        assert_eq!(
            repo.get_by_id("u-1").await.unwrap().unwrap().role,
            UserRole::Admin
        );
        assert!(repo.delete_by_id("u-1").await.unwrap());
        assert!(!repo.delete_by_id("u-1").await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 0);
        assert_eq!(repo.clear().await.unwrap(), 0);
    }
}
