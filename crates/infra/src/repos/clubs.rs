use sqlx::Result as SqlxResult;
use uuid::Uuid;

use crate::db::Db;
use crate::models::{ClubRow, MembershipRow};
use crate::pagination::LimitOffset;
use crate::roles::Role;

#[derive(Debug, Clone)]
pub struct NewClub {
    pub name: String,
    pub location: String,
    pub description: String,
}

#[derive(Clone)]
pub struct ClubRepo {
    pool: Db,
}

impl ClubRepo {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }

    /// Create a club together with its owning membership. The two inserts
    /// commit as one unit so a club is never observable without an owner.
    pub async fn create(&self, founder_id: Uuid, club: NewClub) -> SqlxResult<ClubRow> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ClubRow>(
            r#"
            INSERT INTO clubs (name, location, description)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&club.name)
        .bind(&club.location)
        .bind(&club.description)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO memberships (user_id, club_id, role) VALUES ($1, $2, $3)")
            .bind(founder_id)
            .bind(row.id)
            .bind(Role::Owner.rank())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row)
    }

    pub async fn get(&self, id: Uuid) -> SqlxResult<Option<ClubRow>> {
        sqlx::query_as::<_, ClubRow>("SELECT * FROM clubs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn list(&self, page: LimitOffset) -> SqlxResult<Vec<ClubRow>> {
        sqlx::query_as::<_, ClubRow>(
            r#"
            SELECT *
            FROM clubs
            ORDER BY name ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_by_name(&self, name: &str) -> SqlxResult<Option<ClubRow>> {
        sqlx::query_as::<_, ClubRow>("SELECT * FROM clubs WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
    }

    /// The membership holding the owner rank; exactly one exists per club
    /// (enforced by a partial unique index).
    pub async fn owner_membership(&self, club_id: Uuid) -> SqlxResult<Option<MembershipRow>> {
        sqlx::query_as::<_, MembershipRow>(
            "SELECT * FROM memberships WHERE club_id = $1 AND role = $2",
        )
        .bind(club_id)
        .bind(Role::Owner.rank())
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn member_count(&self, club_id: Uuid) -> SqlxResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM memberships WHERE club_id = $1")
            .bind(club_id)
            .fetch_one(&self.pool)
            .await
    }
}
