use sqlx::Result as SqlxResult;
use uuid::Uuid;

use crate::db::{is_unique_violation, Db};
use crate::models::UserRow;
use crate::pagination::LimitOffset;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub experience: i16,
    pub bio: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub email: String,
    pub name: String,
    pub experience: i16,
    pub bio: String,
}

/// Outcome of creating or re-keying a user; the email column is unique at
/// the storage layer.
#[derive(Debug, Clone)]
pub enum CreateUser {
    Created(UserRow),
    EmailTaken,
}

#[derive(Clone)]
pub struct UserRepo {
    pool: Db,
}

impl UserRepo {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user: NewUser) -> SqlxResult<CreateUser> {
        let result = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, name, experience, bio, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.experience)
        .bind(&user.bio)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(CreateUser::Created(row)),
            Err(e) if is_unique_violation(&e) => Ok(CreateUser::EmailTaken),
            Err(e) => Err(e),
        }
    }

    pub async fn get_by_id(&self, id: Uuid) -> SqlxResult<Option<UserRow>> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn get_by_email(&self, email: &str) -> SqlxResult<Option<UserRow>> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    /// Members list, ordered by experience (strongest last, per the
    /// historical ordering) then name.
    pub async fn list(&self, search: Option<String>, page: LimitOffset) -> SqlxResult<Vec<UserRow>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT *
            FROM users
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%' OR email ILIKE '%' || $1 || '%')
            ORDER BY experience ASC, name ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(search)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> SqlxResult<CreateUser> {
        let result = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET email = $2, name = $3, experience = $4, bio = $5, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.email)
        .bind(&update.name)
        .bind(update.experience)
        .bind(&update.bio)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(CreateUser::Created(row)),
            Err(e) if is_unique_violation(&e) => Ok(CreateUser::EmailTaken),
            Err(e) => Err(e),
        }
    }

    pub async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> SqlxResult<()> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
