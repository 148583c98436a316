// Utility functions
pub mod error;
pub mod sanitize;
pub mod validation;

pub use error::*;
pub use sanitize::*;
pub use validation::*;
