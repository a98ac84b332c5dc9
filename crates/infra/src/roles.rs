use serde::{Deserialize, Serialize};

/// Governance rank inside a club. Stored as a smallint rank in the
/// `memberships` table: owner = 1, officer = 2, member = 3. Owner is the
/// strongest rank and there is exactly one owner per club.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Owner,
    Officer,
    Member,
}

impl Role {
    pub const fn rank(self) -> i16 {
        match self {
            Role::Owner => 1,
            Role::Officer => 2,
            Role::Member => 3,
        }
    }

    /// Decode a stored rank. Ranks outside 1..=3 do exist in legacy data
    /// and must never be acted upon, so decoding is fallible rather than
    /// clamping.
    pub const fn from_rank(rank: i16) -> Option<Role> {
        match rank {
            1 => Some(Role::Owner),
            2 => Some(Role::Officer),
            3 => Some(Role::Member),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Officer => "officer",
            Role::Member => "member",
        }
    }

    /// Whether this role is at least as strong as `required`.
    pub const fn at_least(self, required: Role) -> bool {
        self.rank() <= required.rank()
    }
}

/// A requested change to a member's role, applied by the club owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleAction {
    Promote,
    Demote,
    TransferOwnership,
}

/// The single source of truth for role transitions.
///
/// Returns the target's new role, or `None` when the rules leave the
/// target untouched:
/// - promote only lifts a member to officer; ownership never moves this way
/// - demote only drops an officer to member; the owner cannot be demoted
/// - ownership transfer requires the target to already be an officer
///
/// The two-row side of a transfer (the acting owner stepping down to
/// officer) is handled by the membership repository, which only performs
/// the swap when this table approves the target side.
pub const fn transition(target: Role, action: RoleAction) -> Option<Role> {
    match (action, target) {
        (RoleAction::Promote, Role::Member) => Some(Role::Officer),
        (RoleAction::Promote, Role::Officer | Role::Owner) => None,
        (RoleAction::Demote, Role::Officer) => Some(Role::Member),
        (RoleAction::Demote, Role::Member | Role::Owner) => None,
        (RoleAction::TransferOwnership, Role::Officer) => Some(Role::Owner),
        (RoleAction::TransferOwnership, Role::Member | Role::Owner) => None,
    }
}
