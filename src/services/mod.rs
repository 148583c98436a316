pub mod auth_service;
pub mod catalog_service;
pub mod dukaan_service;
pub mod rating_service;
pub mod user_service;

pub use auth_service::{AuthService, Claims};
