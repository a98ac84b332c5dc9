use sqlx::Result as SqlxResult;
use uuid::Uuid;

use crate::db::{is_unique_violation, Db};
use crate::models::{ApplicationRow, ApplicationStatus, MembershipRow};
use crate::roles::Role;

/// Outcome of submitting a membership application; `(user, club)` is
/// unique at the storage layer, resolved or not.
#[derive(Debug, Clone)]
pub enum SubmitApplication {
    Created(ApplicationRow),
    AlreadyApplied,
}

/// Outcome of resolving a pending application. `membership` is present
/// exactly when the application was accepted and the member row was
/// created in the same transaction.
#[derive(Debug, Clone)]
pub enum ResolveApplication {
    Resolved {
        application: ApplicationRow,
        membership: Option<MembershipRow>,
    },
    /// The application already reached a terminal state; nothing changed.
    AlreadyResolved { status: String },
    NotFound,
}

#[derive(Clone)]
pub struct ApplicationRepo {
    pool: Db,
}

impl ApplicationRepo {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }

    pub async fn submit(
        &self,
        user_id: Uuid,
        club_id: Uuid,
        statement: &str,
    ) -> SqlxResult<SubmitApplication> {
        let result = sqlx::query_as::<_, ApplicationRow>(
            r#"
            INSERT INTO applications (user_id, club_id, statement, status)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(club_id)
        .bind(statement)
        .bind(ApplicationStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(SubmitApplication::Created(row)),
            Err(e) if is_unique_violation(&e) => Ok(SubmitApplication::AlreadyApplied),
            Err(e) => Err(e),
        }
    }

    pub async fn get(&self, id: Uuid) -> SqlxResult<Option<ApplicationRow>> {
        sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Pending applications for a club, newest first.
    pub async fn pending_for_club(&self, club_id: Uuid) -> SqlxResult<Vec<ApplicationRow>> {
        sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT *
            FROM applications
            WHERE club_id = $1 AND status = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(club_id)
        .bind(ApplicationStatus::Pending.as_str())
        .fetch_all(&self.pool)
        .await
    }

    pub async fn pending_count(&self, club_id: Uuid) -> SqlxResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE club_id = $1 AND status = $2")
            .bind(club_id)
            .bind(ApplicationStatus::Pending.as_str())
            .fetch_one(&self.pool)
            .await
    }

    /// One user's applications across all clubs, newest first.
    pub async fn for_user(&self, user_id: Uuid) -> SqlxResult<Vec<ApplicationRow>> {
        sqlx::query_as::<_, ApplicationRow>(
            "SELECT * FROM applications WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Resolve a pending application. On accept, the status flip and the
    /// member-rank membership insert commit together; a failure of either
    /// rolls back both. The row is locked so two concurrent resolutions
    /// cannot both observe `pending`.
    pub async fn resolve(&self, id: Uuid, accept: bool) -> SqlxResult<ResolveApplication> {
        let mut tx = self.pool.begin().await?;

        let app = sqlx::query_as::<_, ApplicationRow>(
            "SELECT * FROM applications WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(app) = app else {
            return Ok(ResolveApplication::NotFound);
        };
        if app.status != ApplicationStatus::Pending.as_str() {
            return Ok(ResolveApplication::AlreadyResolved { status: app.status });
        }

        let status = if accept {
            ApplicationStatus::Accepted
        } else {
            ApplicationStatus::Rejected
        };

        let application = sqlx::query_as::<_, ApplicationRow>(
            "UPDATE applications SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let membership = if accept {
            // The applicant may already hold a membership from another
            // path; accepting then keeps the existing row rather than
            // violating the (user, club) key.
            sqlx::query_as::<_, MembershipRow>(
                r#"
                INSERT INTO memberships (user_id, club_id, statement, role)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (user_id, club_id) DO NOTHING
                RETURNING *
                "#,
            )
            .bind(application.user_id)
            .bind(application.club_id)
            .bind(&application.statement)
            .bind(Role::Member.rank())
            .fetch_optional(&mut *tx)
            .await?
        } else {
            None
        };

        tx.commit().await?;
        Ok(ResolveApplication::Resolved {
            application,
            membership,
        })
    }
}
