pub mod catalog;
pub mod dukaan;
pub mod rating;
pub mod user;

pub use catalog::*;
pub use dukaan::*;
pub use rating::*;
pub use user::*;
