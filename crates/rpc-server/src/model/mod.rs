//! Domain models for the resources served by this application.

pub mod todo;
pub mod user;

pub use todo::*;
pub use user::*;
