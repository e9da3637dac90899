#![allow(non_snake_case)]

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod forms;
pub mod session;
pub mod storage;

pub use api::{Paging, TripQuery};
pub use client::{ApiClient, RequestOptions};
pub use config::ClientConfig;
pub use error::{error_message, ApiError, StorageError, GENERIC_ERROR_MESSAGE};
pub use forms::{ProfileDraft, RegisterForm};
pub use session::Session;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
