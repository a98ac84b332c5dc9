use async_graphql::{Context, Object, Result, ID};
use chrono::Utc;

use infra::models::Experience;
use infra::repos::{
    ApplicationRepo, ClubRepo, CreateTournament, CreateTournamentOutcome, CreateUser,
    EnterTournament, MembershipRepo, NewClub, NewUser, ProfileUpdate, ResolveApplication,
    RoleChange, SubmitApplication, TournamentRepo, UserRepo, WithdrawTournament,
};
use infra::Role;

use crate::auth::PasswordService;
use crate::error::{gql, AppError};
use crate::gql::guards::{self, parse_id};
use crate::gql::types::{
    Application, ApplyToClubInput, AuthPayload, ChangePasswordInput, Club, CreateClubInput,
    CreateTournamentInput, EnterTournamentPayload, LoginInput, RegisterInput, RoleChangePayload,
    RoleChangeStatus, SetMemberRoleInput, Tournament, UpdateProfileInput, User,
};
use crate::state::AppState;
use crate::validate;

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Create an account and sign the new user in.
    async fn register(&self, ctx: &Context<'_>, input: RegisterInput) -> Result<AuthPayload> {
        let bio = input.bio.unwrap_or_default();
        validate::email(&input.email).map_err(gql)?;
        validate::required("name", &input.name, validate::MAX_NAME_LEN).map_err(gql)?;
        validate::optional("bio", &bio, validate::MAX_BIO_LEN).map_err(gql)?;
        PasswordService::validate_password_strength(&input.password).map_err(gql)?;

        let state = ctx.data::<AppState>()?;
        let password_hash = PasswordService::hash_password(&input.password).map_err(gql)?;
        let created = UserRepo::new(state.db.clone())
            .create(NewUser {
                email: input.email,
                name: input.name,
                experience: Experience::from(input.experience).level(),
                bio,
                password_hash,
            })
            .await
            .map_err(gql)?;

        let user = match created {
            CreateUser::Created(row) => row,
            CreateUser::EmailTaken => {
                return Err(gql(AppError::validation("email", "email is already registered")))
            }
        };

        let token = state
            .jwt_service()
            .create_token(user.id, user.email.clone())
            .map_err(gql)?;
        Ok(AuthPayload {
            token,
            user: user.into(),
        })
    }

    async fn login(&self, ctx: &Context<'_>, input: LoginInput) -> Result<AuthPayload> {
        let state = ctx.data::<AppState>()?;
        let user = UserRepo::new(state.db.clone())
            .get_by_email(&input.email)
            .await
            .map_err(gql)?;

        // One error for both unknown email and wrong password.
        let Some(user) = user else {
            return Err(gql(AppError::InvalidCredentials));
        };
        if !PasswordService::verify_password(&input.password, &user.password_hash).map_err(gql)? {
            return Err(gql(AppError::InvalidCredentials));
        }

        let token = state
            .jwt_service()
            .create_token(user.id, user.email.clone())
            .map_err(gql)?;
        Ok(AuthPayload {
            token,
            user: user.into(),
        })
    }

    async fn update_profile(&self, ctx: &Context<'_>, input: UpdateProfileInput) -> Result<User> {
        let user_id = guards::current_user_id(ctx)?;
        let bio = input.bio.unwrap_or_default();
        validate::email(&input.email).map_err(gql)?;
        validate::required("name", &input.name, validate::MAX_NAME_LEN).map_err(gql)?;
        validate::optional("bio", &bio, validate::MAX_BIO_LEN).map_err(gql)?;

        let state = ctx.data::<AppState>()?;
        let updated = UserRepo::new(state.db.clone())
            .update_profile(
                user_id,
                ProfileUpdate {
                    email: input.email,
                    name: input.name,
                    experience: Experience::from(input.experience).level(),
                    bio,
                },
            )
            .await
            .map_err(gql)?;

        match updated {
            CreateUser::Created(row) => Ok(row.into()),
            CreateUser::EmailTaken => {
                Err(gql(AppError::validation("email", "email is already registered")))
            }
        }
    }

    /// Change the caller's password; the current password is verified
    /// first.
    async fn change_password(&self, ctx: &Context<'_>, input: ChangePasswordInput) -> Result<bool> {
        let user = guards::current_user(ctx).await?;
        if !PasswordService::verify_password(&input.current_password, &user.password_hash)
            .map_err(gql)?
        {
            return Err(gql(AppError::InvalidCredentials));
        }
        PasswordService::validate_password_strength(&input.new_password).map_err(gql)?;

        let state = ctx.data::<AppState>()?;
        let password_hash = PasswordService::hash_password(&input.new_password).map_err(gql)?;
        UserRepo::new(state.db.clone())
            .set_password_hash(user.id, &password_hash)
            .await
            .map_err(gql)?;
        Ok(true)
    }

    /// Found a club; the caller becomes its owner in the same transaction.
    async fn create_club(&self, ctx: &Context<'_>, input: CreateClubInput) -> Result<Club> {
        let user_id = guards::current_user_id(ctx)?;
        validate::required("name", &input.name, validate::MAX_CLUB_NAME_LEN).map_err(gql)?;
        validate::required("location", &input.location, validate::MAX_CLUB_LOCATION_LEN)
            .map_err(gql)?;
        validate::required("description", &input.description, validate::MAX_DESCRIPTION_LEN)
            .map_err(gql)?;

        let state = ctx.data::<AppState>()?;
        let club = ClubRepo::new(state.db.clone())
            .create(
                user_id,
                NewClub {
                    name: input.name,
                    location: input.location,
                    description: input.description,
                },
            )
            .await
            .map_err(gql)?;
        Ok(club.into())
    }

    /// Ask to join a club. A user holds at most one application per club,
    /// resolved or not.
    async fn apply_to_club(&self, ctx: &Context<'_>, input: ApplyToClubInput) -> Result<Application> {
        let user_id = guards::current_user_id(ctx)?;
        validate::required("statement", &input.statement, validate::MAX_STATEMENT_LEN)
            .map_err(gql)?;

        let state = ctx.data::<AppState>()?;
        let club_id = parse_id(&input.club_id)?;
        if ClubRepo::new(state.db.clone())
            .get(club_id)
            .await
            .map_err(gql)?
            .is_none()
        {
            return Err(gql(AppError::NotFound("club")));
        }

        let outcome = ApplicationRepo::new(state.db.clone())
            .submit(user_id, club_id, &input.statement)
            .await
            .map_err(gql)?;

        match outcome {
            SubmitApplication::Created(row) => Ok(row.into()),
            SubmitApplication::AlreadyApplied => Err(gql(AppError::validation(
                "club_id",
                "you have already applied to this club",
            ))),
        }
    }

    /// Accept or reject a pending application. Accepting creates the
    /// member-rank membership in the same transaction as the status flip.
    async fn resolve_application(
        &self,
        ctx: &Context<'_>,
        application_id: ID,
        accept: bool,
    ) -> Result<Application> {
        let application_id = parse_id(&application_id)?;
        let state = ctx.data::<AppState>()?;

        let repo = ApplicationRepo::new(state.db.clone());
        let Some(application) = repo.get(application_id).await.map_err(gql)? else {
            return Err(gql(AppError::NotFound("application")));
        };
        guards::require_club_role(ctx, application.club_id, Role::Officer).await?;

        match repo.resolve(application_id, accept).await.map_err(gql)? {
            ResolveApplication::Resolved { application, .. } => Ok(application.into()),
            ResolveApplication::AlreadyResolved { status } => Err(gql(AppError::validation(
                "status",
                format!("application has already been {status}"),
            ))),
            ResolveApplication::NotFound => Err(gql(AppError::NotFound("application"))),
        }
    }

    /// Promote, demote, or hand ownership to a member of a club the caller
    /// owns.
    async fn set_member_role(
        &self,
        ctx: &Context<'_>,
        input: SetMemberRoleInput,
    ) -> Result<RoleChangePayload> {
        let actor_id = guards::current_user_id(ctx)?;
        let state = ctx.data::<AppState>()?;
        let target_id = parse_id(&input.user_id)?;
        let club_id = parse_id(&input.club_id)?;

        let outcome = MembershipRepo::new(state.db.clone())
            .change_role(actor_id, target_id, club_id, input.action.into())
            .await
            .map_err(gql)?;

        match outcome {
            RoleChange::Applied { previous, current } => Ok(RoleChangePayload {
                status: RoleChangeStatus::Applied,
                previous_role: previous.into(),
                role: current.into(),
            }),
            RoleChange::Unchanged { role } => Ok(RoleChangePayload {
                status: RoleChangeStatus::Unchanged,
                previous_role: role.into(),
                role: role.into(),
            }),
            RoleChange::Forbidden { .. } => Err(gql(AppError::Forbidden(
                "only the club owner can change member roles".into(),
            ))),
            RoleChange::TargetNotFound => Err(gql(AppError::NotFound("membership"))),
            RoleChange::CorruptRole { rank } => Err(gql(AppError::Internal(format!(
                "membership holds an invalid role rank {rank}"
            )))),
        }
    }

    /// Schedule a tournament for a club the caller owns or officers.
    async fn create_tournament(
        &self,
        ctx: &Context<'_>,
        input: CreateTournamentInput,
    ) -> Result<Tournament> {
        guards::claims(ctx)?;
        validate::required("name", &input.name, validate::MAX_NAME_LEN).map_err(gql)?;
        validate::required("description", &input.description, validate::MAX_DESCRIPTION_LEN)
            .map_err(gql)?;
        validate::capacity(input.capacity).map_err(gql)?;
        validate::deadline(input.deadline, Utc::now().date_naive()).map_err(gql)?;

        let club_id = parse_id(&input.club_id)?;
        let (organiser_id, _) = guards::require_club_role(ctx, club_id, Role::Officer).await?;

        let state = ctx.data::<AppState>()?;
        let outcome = TournamentRepo::new(state.db.clone())
            .create(CreateTournament {
                club_id,
                organiser_id,
                name: input.name,
                description: input.description,
                deadline: input.deadline,
                capacity: input.capacity,
            })
            .await
            .map_err(gql)?;

        match outcome {
            CreateTournamentOutcome::Created(row) => Ok(row.into()),
            CreateTournamentOutcome::DuplicateName => Err(gql(AppError::validation(
                "name",
                "a tournament with this name already exists",
            ))),
        }
    }

    /// Sign up for a tournament. Entering twice keeps the original entry;
    /// a full roster refuses the sign-up.
    async fn enter_tournament(
        &self,
        ctx: &Context<'_>,
        tournament_id: ID,
    ) -> Result<EnterTournamentPayload> {
        let user_id = guards::current_user_id(ctx)?;
        let state = ctx.data::<AppState>()?;
        let tournament_id = parse_id(&tournament_id)?;

        let outcome = TournamentRepo::new(state.db.clone())
            .enter(user_id, tournament_id)
            .await
            .map_err(gql)?;

        match outcome {
            EnterTournament::Entered(entry) => Ok(EnterTournamentPayload {
                entered: true,
                entry: entry.into(),
            }),
            EnterTournament::AlreadyEntered(entry) => Ok(EnterTournamentPayload {
                entered: false,
                entry: entry.into(),
            }),
            EnterTournament::Full => Err(gql(AppError::validation(
                "capacity",
                "the tournament is already full",
            ))),
            EnterTournament::NotFound => Err(gql(AppError::NotFound("tournament"))),
        }
    }

    /// Leave a tournament roster.
    async fn withdraw_tournament(&self, ctx: &Context<'_>, tournament_id: ID) -> Result<bool> {
        let user_id = guards::current_user_id(ctx)?;
        let state = ctx.data::<AppState>()?;
        let tournament_id = parse_id(&tournament_id)?;

        match TournamentRepo::new(state.db.clone())
            .withdraw(user_id, tournament_id)
            .await
            .map_err(gql)?
        {
            WithdrawTournament::Withdrawn => Ok(true),
            WithdrawTournament::NotEntered => Err(gql(AppError::NotFound("tournament entry"))),
        }
    }
}
