pub mod db;
pub mod models;
pub mod pagination;
pub mod repos;
pub mod roles;

pub use db::Db;
pub use roles::{Role, RoleAction};
