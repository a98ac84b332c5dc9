use async_graphql::dataloader::DataLoader;
use async_graphql::{ComplexObject, Context, Enum, Error, InputObject, Result, SimpleObject, ID};
use chrono::{DateTime, NaiveDate, Utc};

use infra::models::{
    ApplicationRow, ApplicationStatus, ClubRow, Experience, MembershipRow, TournamentEntryRow,
    TournamentRow, UserRow,
};
use infra::repos::TournamentRepo;
use infra::Role;

use crate::gql::guards::parse_id;
use crate::gql::loaders::{ClubLoader, UserLoader};
use crate::state::AppState;

#[derive(Enum, Copy, Clone, Eq, PartialEq)]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
    Grandmaster,
}

impl From<Experience> for ExperienceLevel {
    fn from(exp: Experience) -> Self {
        match exp {
            Experience::Beginner => ExperienceLevel::Beginner,
            Experience::Intermediate => ExperienceLevel::Intermediate,
            Experience::Advanced => ExperienceLevel::Advanced,
            Experience::Grandmaster => ExperienceLevel::Grandmaster,
        }
    }
}

impl From<ExperienceLevel> for Experience {
    fn from(level: ExperienceLevel) -> Self {
        match level {
            ExperienceLevel::Beginner => Experience::Beginner,
            ExperienceLevel::Intermediate => Experience::Intermediate,
            ExperienceLevel::Advanced => Experience::Advanced,
            ExperienceLevel::Grandmaster => Experience::Grandmaster,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq)]
pub enum MemberRole {
    Owner,
    Officer,
    Member,
}

impl From<Role> for MemberRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Owner => MemberRole::Owner,
            Role::Officer => MemberRole::Officer,
            Role::Member => MemberRole::Member,
        }
    }
}

impl From<MemberRole> for Role {
    fn from(role: MemberRole) -> Self {
        match role {
            MemberRole::Owner => Role::Owner,
            MemberRole::Officer => Role::Officer,
            MemberRole::Member => Role::Member,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq)]
pub enum ApplicationState {
    Pending,
    Accepted,
    Rejected,
}

impl From<ApplicationStatus> for ApplicationState {
    fn from(status: ApplicationStatus) -> Self {
        match status {
            ApplicationStatus::Pending => ApplicationState::Pending,
            ApplicationStatus::Accepted => ApplicationState::Accepted,
            ApplicationStatus::Rejected => ApplicationState::Rejected,
        }
    }
}

/// The owner's lever over a member's rank; TRANSFER_OWNERSHIP swaps the
/// owner and an officer.
#[derive(Enum, Copy, Clone, Eq, PartialEq)]
pub enum RoleChangeAction {
    Promote,
    Demote,
    TransferOwnership,
}

impl From<RoleChangeAction> for infra::RoleAction {
    fn from(action: RoleChangeAction) -> Self {
        match action {
            RoleChangeAction::Promote => infra::RoleAction::Promote,
            RoleChangeAction::Demote => infra::RoleAction::Demote,
            RoleChangeAction::TransferOwnership => infra::RoleAction::TransferOwnership,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq)]
pub enum RoleChangeStatus {
    Applied,
    Unchanged,
}

#[derive(SimpleObject, Clone)]
pub struct User {
    pub id: ID,
    pub email: String,
    pub name: String,
    pub experience: ExperienceLevel,
    pub bio: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id.into(),
            email: row.email,
            name: row.name,
            experience: Experience::from_level(row.experience)
                .unwrap_or(Experience::Beginner)
                .into(),
            bio: row.bio,
        }
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Club {
    pub id: ID,
    pub name: String,
    pub location: String,
    pub description: String,
}

impl From<ClubRow> for Club {
    fn from(row: ClubRow) -> Self {
        Club {
            id: row.id.into(),
            name: row.name,
            location: row.location,
            description: row.description,
        }
    }
}

#[ComplexObject]
impl Club {
    /// The club's current owner; exactly one exists per club.
    async fn owner(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let state = ctx.data::<AppState>()?;
        let club_id = parse_id(&self.id)?;
        let repo = infra::repos::ClubRepo::new(state.db.clone());
        let Some(ownership) = repo.owner_membership(club_id).await? else {
            return Ok(None);
        };

        let loader = ctx.data::<DataLoader<UserLoader>>()?;
        let user = loader
            .load_one(ownership.user_id)
            .await
            .map_err(|e| Error::new(e.to_string()))?;
        Ok(user.map(User::from))
    }

    async fn member_count(&self, ctx: &Context<'_>) -> Result<i64> {
        let state = ctx.data::<AppState>()?;
        let club_id = parse_id(&self.id)?;
        Ok(infra::repos::ClubRepo::new(state.db.clone())
            .member_count(club_id)
            .await?)
    }

    async fn pending_application_count(&self, ctx: &Context<'_>) -> Result<i64> {
        let state = ctx.data::<AppState>()?;
        let club_id = parse_id(&self.id)?;
        Ok(infra::repos::ApplicationRepo::new(state.db.clone())
            .pending_count(club_id)
            .await?)
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Membership {
    pub id: ID,
    pub user_id: ID,
    pub club_id: ID,
    pub role: MemberRole,
    pub statement: String,
    pub created_at: DateTime<Utc>,
}

impl Membership {
    /// Rows holding a rank outside 1..=3 cannot be rendered and are
    /// dropped from listings.
    pub fn try_from_row(row: MembershipRow) -> Option<Self> {
        let role = Role::from_rank(row.role)?;
        Some(Membership {
            id: row.id.into(),
            user_id: row.user_id.into(),
            club_id: row.club_id.into(),
            role: role.into(),
            statement: row.statement,
            created_at: row.created_at,
        })
    }
}

#[ComplexObject]
impl Membership {
    async fn user(&self, ctx: &Context<'_>) -> Result<User> {
        load_user(ctx, &self.user_id).await
    }

    async fn club(&self, ctx: &Context<'_>) -> Result<Club> {
        load_club(ctx, &self.club_id).await
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Application {
    pub id: ID,
    pub user_id: ID,
    pub club_id: ID,
    pub statement: String,
    pub status: ApplicationState,
    pub created_at: DateTime<Utc>,
}

impl From<ApplicationRow> for Application {
    fn from(row: ApplicationRow) -> Self {
        Application {
            id: row.id.into(),
            user_id: row.user_id.into(),
            club_id: row.club_id.into(),
            statement: row.statement,
            status: ApplicationStatus::parse(&row.status)
                .map(ApplicationState::from)
                .unwrap_or(ApplicationState::Pending),
            created_at: row.created_at,
        }
    }
}

#[ComplexObject]
impl Application {
    async fn applicant(&self, ctx: &Context<'_>) -> Result<User> {
        load_user(ctx, &self.user_id).await
    }

    async fn club(&self, ctx: &Context<'_>) -> Result<Club> {
        load_club(ctx, &self.club_id).await
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Tournament {
    pub id: ID,
    pub club_id: ID,
    pub organiser_id: ID,
    pub name: String,
    pub description: String,
    pub deadline: NaiveDate,
    pub capacity: i32,
}

impl From<TournamentRow> for Tournament {
    fn from(row: TournamentRow) -> Self {
        Tournament {
            id: row.id.into(),
            club_id: row.club_id.into(),
            organiser_id: row.organiser_id.into(),
            name: row.name,
            description: row.description,
            deadline: row.deadline,
            capacity: row.capacity,
        }
    }
}

#[ComplexObject]
impl Tournament {
    async fn club(&self, ctx: &Context<'_>) -> Result<Club> {
        load_club(ctx, &self.club_id).await
    }

    async fn organiser(&self, ctx: &Context<'_>) -> Result<User> {
        load_user(ctx, &self.organiser_id).await
    }

    async fn contestants(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let state = ctx.data::<AppState>()?;
        let tournament_id = parse_id(&self.id)?;
        let rows = TournamentRepo::new(state.db.clone())
            .contestants(tournament_id)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn contestant_count(&self, ctx: &Context<'_>) -> Result<i64> {
        let state = ctx.data::<AppState>()?;
        let tournament_id = parse_id(&self.id)?;
        Ok(TournamentRepo::new(state.db.clone())
            .contestant_count(tournament_id)
            .await?)
    }
}

#[derive(SimpleObject, Clone)]
pub struct TournamentEntry {
    pub id: ID,
    pub tournament_id: ID,
    pub user_id: ID,
    pub created_at: DateTime<Utc>,
}

impl From<TournamentEntryRow> for TournamentEntry {
    fn from(row: TournamentEntryRow) -> Self {
        TournamentEntry {
            id: row.id.into(),
            tournament_id: row.tournament_id.into(),
            user_id: row.user_id.into(),
            created_at: row.created_at,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

/// Result of a role-change request; UNCHANGED means the transition rules
/// left the target as-is (for example promoting an officer).
#[derive(SimpleObject, Clone)]
pub struct RoleChangePayload {
    pub status: RoleChangeStatus,
    pub previous_role: MemberRole,
    pub role: MemberRole,
}

/// Result of a tournament sign-up; `entered` is false when the caller was
/// already on the roster and the original entry is returned.
#[derive(SimpleObject, Clone)]
pub struct EnterTournamentPayload {
    pub entered: bool,
    pub entry: TournamentEntry,
}

#[derive(InputObject)]
pub struct RegisterInput {
    pub email: String,
    pub name: String,
    pub experience: ExperienceLevel,
    pub bio: Option<String>,
    pub password: String,
}

#[derive(InputObject)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(InputObject)]
pub struct UpdateProfileInput {
    pub email: String,
    pub name: String,
    pub experience: ExperienceLevel,
    pub bio: Option<String>,
}

#[derive(InputObject)]
pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
}

#[derive(InputObject)]
pub struct CreateClubInput {
    pub name: String,
    pub location: String,
    pub description: String,
}

#[derive(InputObject)]
pub struct ApplyToClubInput {
    pub club_id: ID,
    pub statement: String,
}

#[derive(InputObject)]
pub struct CreateTournamentInput {
    pub club_id: ID,
    pub name: String,
    pub description: String,
    pub deadline: NaiveDate,
    pub capacity: i32,
}

#[derive(InputObject)]
pub struct SetMemberRoleInput {
    pub user_id: ID,
    pub club_id: ID,
    pub action: RoleChangeAction,
}

async fn load_user(ctx: &Context<'_>, id: &ID) -> Result<User> {
    let loader = ctx.data::<DataLoader<UserLoader>>()?;
    let user_id = parse_id(id)?;
    match loader
        .load_one(user_id)
        .await
        .map_err(|e| Error::new(e.to_string()))?
    {
        Some(row) => Ok(row.into()),
        None => Err(Error::new("User not found")),
    }
}

async fn load_club(ctx: &Context<'_>, id: &ID) -> Result<Club> {
    let loader = ctx.data::<DataLoader<ClubLoader>>()?;
    let club_id = parse_id(id)?;
    match loader
        .load_one(club_id)
        .await
        .map_err(|e| Error::new(e.to_string()))?
    {
        Some(row) => Ok(row.into()),
        None => Err(Error::new("Club not found")),
    }
}
