use chrono::NaiveDate;
use sqlx::Result as SqlxResult;
use uuid::Uuid;

use crate::db::{is_unique_violation, Db};
use crate::models::{TournamentEntryRow, TournamentRow, UserRow};
use crate::pagination::LimitOffset;

#[derive(Debug, Clone)]
pub struct CreateTournament {
    pub club_id: Uuid,
    pub organiser_id: Uuid,
    pub name: String,
    pub description: String,
    pub deadline: NaiveDate,
    pub capacity: i32,
}

/// Tournament names are unique across all clubs.
#[derive(Debug, Clone)]
pub enum CreateTournamentOutcome {
    Created(TournamentRow),
    DuplicateName,
}

/// Outcome of a tournament sign-up. Entering twice keeps the original row;
/// the roster never grows past the tournament's capacity.
#[derive(Debug, Clone)]
pub enum EnterTournament {
    Entered(TournamentEntryRow),
    AlreadyEntered(TournamentEntryRow),
    Full,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WithdrawTournament {
    Withdrawn,
    NotEntered,
}

#[derive(Clone)]
pub struct TournamentRepo {
    pool: Db,
}

impl TournamentRepo {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }

    pub async fn create(&self, t: CreateTournament) -> SqlxResult<CreateTournamentOutcome> {
        let result = sqlx::query_as::<_, TournamentRow>(
            r#"
            INSERT INTO tournaments (club_id, organiser_id, name, description, deadline, capacity)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(t.club_id)
        .bind(t.organiser_id)
        .bind(&t.name)
        .bind(&t.description)
        .bind(t.deadline)
        .bind(t.capacity)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(CreateTournamentOutcome::Created(row)),
            Err(e) if is_unique_violation(&e) => Ok(CreateTournamentOutcome::DuplicateName),
            Err(e) => Err(e),
        }
    }

    pub async fn get(&self, id: Uuid) -> SqlxResult<Option<TournamentRow>> {
        sqlx::query_as::<_, TournamentRow>("SELECT * FROM tournaments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn list_for_club(&self, club_id: Uuid, page: LimitOffset) -> SqlxResult<Vec<TournamentRow>> {
        sqlx::query_as::<_, TournamentRow>(
            r#"
            SELECT *
            FROM tournaments
            WHERE club_id = $1
            ORDER BY deadline ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(club_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
    }

    /// Tournaments hosted by clubs the user belongs to, nearest deadline
    /// first.
    pub async fn list_for_user(&self, user_id: Uuid, page: LimitOffset) -> SqlxResult<Vec<TournamentRow>> {
        sqlx::query_as::<_, TournamentRow>(
            r#"
            SELECT t.*
            FROM tournaments t
            JOIN memberships m ON m.club_id = t.club_id
            WHERE m.user_id = $1
            ORDER BY t.deadline ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
    }

    /// Sign a user up. The tournament row is locked while the roster is
    /// counted so concurrent sign-ups cannot both squeeze into the last
    /// seat.
    pub async fn enter(&self, user_id: Uuid, tournament_id: Uuid) -> SqlxResult<EnterTournament> {
        let mut tx = self.pool.begin().await?;

        let tournament = sqlx::query_as::<_, TournamentRow>(
            "SELECT * FROM tournaments WHERE id = $1 FOR UPDATE",
        )
        .bind(tournament_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(tournament) = tournament else {
            return Ok(EnterTournament::NotFound);
        };

        let existing = sqlx::query_as::<_, TournamentEntryRow>(
            "SELECT * FROM tournament_entries WHERE user_id = $1 AND tournament_id = $2",
        )
        .bind(user_id)
        .bind(tournament_id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(entry) = existing {
            return Ok(EnterTournament::AlreadyEntered(entry));
        }

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM tournament_entries WHERE tournament_id = $1")
                .bind(tournament_id)
                .fetch_one(&mut *tx)
                .await?;

        if count >= i64::from(tournament.capacity) {
            return Ok(EnterTournament::Full);
        }

        let entry = sqlx::query_as::<_, TournamentEntryRow>(
            r#"
            INSERT INTO tournament_entries (user_id, tournament_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(tournament_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(EnterTournament::Entered(entry))
    }

    pub async fn withdraw(
        &self,
        user_id: Uuid,
        tournament_id: Uuid,
    ) -> SqlxResult<WithdrawTournament> {
        let result =
            sqlx::query("DELETE FROM tournament_entries WHERE user_id = $1 AND tournament_id = $2")
                .bind(user_id)
                .bind(tournament_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            Ok(WithdrawTournament::NotEntered)
        } else {
            Ok(WithdrawTournament::Withdrawn)
        }
    }

    pub async fn contestants(&self, tournament_id: Uuid) -> SqlxResult<Vec<UserRow>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.*
            FROM users u
            JOIN tournament_entries e ON e.user_id = u.id
            WHERE e.tournament_id = $1
            ORDER BY e.created_at ASC
            "#,
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn contestant_count(&self, tournament_id: Uuid) -> SqlxResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM tournament_entries WHERE tournament_id = $1")
            .bind(tournament_id)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn is_contestant(&self, user_id: Uuid, tournament_id: Uuid) -> SqlxResult<bool> {
        let entry: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM tournament_entries WHERE user_id = $1 AND tournament_id = $2",
        )
        .bind(user_id)
        .bind(tournament_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry.is_some())
    }
}
