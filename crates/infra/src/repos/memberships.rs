use sqlx::Result as SqlxResult;
use uuid::Uuid;

use crate::db::Db;
use crate::models::MembershipRow;
use crate::roles::{self, Role, RoleAction};

/// Outcome of a guarded role transition. Every case is explicit so the API
/// layer can distinguish "applied" from "no-op" from "refused" instead of
/// silently redirecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleChange {
    /// The transition table approved the change and it was committed.
    Applied { previous: Role, current: Role },
    /// The rules leave the target untouched (promoting an officer,
    /// demoting a member, transferring to a non-officer, acting on the
    /// owner).
    Unchanged { role: Role },
    /// The actor is not the club owner (or holds no membership at all).
    Forbidden { actor_role: Option<Role> },
    /// The target holds no membership in this club.
    TargetNotFound,
    /// A stored rank falls outside 1..=3; nothing is mutated.
    CorruptRole { rank: i16 },
}

#[derive(Clone)]
pub struct MembershipRepo {
    pool: Db,
}

impl MembershipRepo {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }

    pub async fn get(&self, user_id: Uuid, club_id: Uuid) -> SqlxResult<Option<MembershipRow>> {
        sqlx::query_as::<_, MembershipRow>(
            "SELECT * FROM memberships WHERE user_id = $1 AND club_id = $2",
        )
        .bind(user_id)
        .bind(club_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// The caller's role in a club, if any. Corrupt ranks read as `None`
    /// so they can never satisfy an authorization check.
    pub async fn role_of(&self, user_id: Uuid, club_id: Uuid) -> SqlxResult<Option<Role>> {
        let row = self.get(user_id, club_id).await?;
        Ok(row.and_then(|m| Role::from_rank(m.role)))
    }

    /// Memberships of one user, optionally narrowed to a single role,
    /// strongest rank first.
    pub async fn for_user(
        &self,
        user_id: Uuid,
        role: Option<Role>,
    ) -> SqlxResult<Vec<MembershipRow>> {
        sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT *
            FROM memberships
            WHERE user_id = $1 AND ($2::smallint IS NULL OR role = $2)
            ORDER BY role ASC
            "#,
        )
        .bind(user_id)
        .bind(role.map(Role::rank))
        .fetch_all(&self.pool)
        .await
    }

    /// A club's roster, strongest rank first.
    pub async fn for_club(&self, club_id: Uuid) -> SqlxResult<Vec<MembershipRow>> {
        sqlx::query_as::<_, MembershipRow>(
            "SELECT * FROM memberships WHERE club_id = $1 ORDER BY role ASC, created_at ASC",
        )
        .bind(club_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Apply a role transition requested by `actor_id` against
    /// `target_id`'s membership in `club_id`.
    ///
    /// Both membership rows are locked for the duration of the transaction
    /// so concurrent transfers cannot interleave; an ownership swap demotes
    /// the acting owner before promoting the target, keeping the one-owner
    /// index satisfied at every statement.
    pub async fn change_role(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        club_id: Uuid,
        action: RoleAction,
    ) -> SqlxResult<RoleChange> {
        let mut tx = self.pool.begin().await?;

        let actor = sqlx::query_as::<_, MembershipRow>(
            "SELECT * FROM memberships WHERE user_id = $1 AND club_id = $2 FOR UPDATE",
        )
        .bind(actor_id)
        .bind(club_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(actor) = actor else {
            return Ok(RoleChange::Forbidden { actor_role: None });
        };
        let Some(actor_role) = Role::from_rank(actor.role) else {
            return Ok(RoleChange::CorruptRole { rank: actor.role });
        };
        if actor_role != Role::Owner {
            return Ok(RoleChange::Forbidden {
                actor_role: Some(actor_role),
            });
        }

        let target = sqlx::query_as::<_, MembershipRow>(
            "SELECT * FROM memberships WHERE user_id = $1 AND club_id = $2 FOR UPDATE",
        )
        .bind(target_id)
        .bind(club_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(target) = target else {
            return Ok(RoleChange::TargetNotFound);
        };
        let Some(target_role) = Role::from_rank(target.role) else {
            return Ok(RoleChange::CorruptRole { rank: target.role });
        };

        let Some(new_role) = roles::transition(target_role, action) else {
            return Ok(RoleChange::Unchanged { role: target_role });
        };

        if action == RoleAction::TransferOwnership {
            sqlx::query("UPDATE memberships SET role = $2, updated_at = now() WHERE id = $1")
                .bind(actor.id)
                .bind(Role::Officer.rank())
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("UPDATE memberships SET role = $2, updated_at = now() WHERE id = $1")
            .bind(target.id)
            .bind(new_role.rank())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(RoleChange::Applied {
            previous: target_role,
            current: new_role,
        })
    }
}
