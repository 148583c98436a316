pub mod auth;
pub mod catalog;
pub mod dukaans;
pub mod health;
pub mod ratings;
pub mod swagger;
pub mod users;
