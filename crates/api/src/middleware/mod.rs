pub mod jwt;

pub use jwt::{jwt_middleware, Identity};
