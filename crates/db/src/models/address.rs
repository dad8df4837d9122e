use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// A delivery address in a user's address book
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Address {
    pub id: Uuid,
    pub user_id: String,
    pub receiver: String,
    pub phone: String,
    pub province: String,
    pub city: String,
    pub district: String,
    pub detail: String,
    pub is_default: bool,
    pub tag: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Address {
    pub fn full_address(&self) -> String {
        format!(
            "{}{}{}{}",
            self.province, self.city, self.district, self.detail
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateAddress {
    pub receiver: String,
    pub phone: String,
    pub province: String,
    pub city: String,
    pub district: String,
    pub detail: String,
    pub is_default: Option<bool>,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateAddress {
    pub receiver: Option<String>,
    pub phone: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub detail: Option<String>,
    pub is_default: Option<bool>,
    pub tag: Option<String>,
}

const ADDRESS_COLUMNS: &str = "id, user_id, receiver, phone, province, city, district, detail, \
     is_default, tag, created_at, updated_at";

impl Address {
    /// Default address first, then newest first
    pub async fn find_by_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Address>(&format!(
            r#"SELECT {ADDRESS_COLUMNS}
               FROM addresses
               WHERE user_id = $1
               ORDER BY is_default DESC, created_at DESC, rowid DESC"#
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_default(
        pool: &SqlitePool,
        user_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Address>(&format!(
            r#"SELECT {ADDRESS_COLUMNS}
               FROM addresses
               WHERE user_id = $1 AND is_default = 1
               LIMIT 1"#
        ))
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Newest address of the user other than `exclude_id`
    pub async fn find_newest_excluding<'e, E>(
        executor: E,
        user_id: &str,
        exclude_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Address>(&format!(
            r#"SELECT {ADDRESS_COLUMNS}
               FROM addresses
               WHERE user_id = $1 AND id != $2
               ORDER BY created_at DESC, rowid DESC
               LIMIT 1"#
        ))
        .bind(user_id)
        .bind(exclude_id)
        .fetch_optional(executor)
        .await
    }

    pub async fn count_for_user<'e, E>(executor: E, user_id: &str) -> Result<i64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM addresses WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(executor)
            .await
    }

    pub async fn create<'e, E>(
        executor: E,
        id: Uuid,
        user_id: &str,
        data: &CreateAddress,
        is_default: bool,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Address>(&format!(
            r#"INSERT INTO addresses (id, user_id, receiver, phone, province, city, district,
                                      detail, is_default, tag)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING {ADDRESS_COLUMNS}"#
        ))
        .bind(id)
        .bind(user_id)
        .bind(&data.receiver)
        .bind(&data.phone)
        .bind(&data.province)
        .bind(&data.city)
        .bind(&data.district)
        .bind(&data.detail)
        .bind(is_default)
        .bind(&data.tag)
        .fetch_one(executor)
        .await
    }

    /// Persist every mutable field of `self`
    pub async fn save<'e, E>(&self, executor: E) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Address>(&format!(
            r#"UPDATE addresses
               SET receiver = $2,
                   phone = $3,
                   province = $4,
                   city = $5,
                   district = $6,
                   detail = $7,
                   is_default = $8,
                   tag = $9,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING {ADDRESS_COLUMNS}"#
        ))
        .bind(self.id)
        .bind(&self.receiver)
        .bind(&self.phone)
        .bind(&self.province)
        .bind(&self.city)
        .bind(&self.district)
        .bind(&self.detail)
        .bind(self.is_default)
        .bind(&self.tag)
        .fetch_one(executor)
        .await
    }

    pub async fn clear_default<'e, E>(executor: E, user_id: &str) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"UPDATE addresses
               SET is_default = 0,
                   updated_at = datetime('now', 'subsec')
               WHERE user_id = $1 AND is_default = 1"#,
        )
        .bind(user_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn set_default_flag<'e, E>(
        executor: E,
        id: Uuid,
        is_default: bool,
    ) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"UPDATE addresses
               SET is_default = $2,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(is_default)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Whether any order was placed to this address
    pub async fn is_used_by_order<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM orders WHERE address_id = $1)",
        )
        .bind(id)
        .fetch_one(executor)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
