pub mod applications;
pub mod clubs;
pub mod memberships;
pub mod tournaments;
pub mod users;

pub use applications::{ApplicationRepo, ResolveApplication, SubmitApplication};
pub use clubs::{ClubRepo, NewClub};
pub use memberships::{MembershipRepo, RoleChange};
pub use tournaments::{
    CreateTournament, CreateTournamentOutcome, EnterTournament, TournamentRepo, WithdrawTournament,
};
pub use users::{CreateUser, NewUser, ProfileUpdate, UserRepo};
