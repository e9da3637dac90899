#![allow(non_snake_case)]

pub mod auth;
pub mod error;
pub mod social;
pub mod trips;
pub mod users;

pub use auth::*;
pub use error::*;
pub use social::*;
pub use trips::*;
pub use users::*;
