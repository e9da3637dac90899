pub mod auth;
pub mod comments;
pub mod members;
pub mod messages;
pub mod trips;
pub mod users;

pub use auth::AuthApi;
pub use comments::CommentsApi;
pub use members::MembersApi;
pub use messages::MessagesApi;
pub use trips::{TripQuery, TripsApi};
pub use users::UsersApi;

use crate::client::{ApiClient, RequestOptions};

/// `skip`/`limit` window for list endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Paging {
    pub skip: u32,
    pub limit: u32,
}

impl Default for Paging {
    fn default() -> Self {
        Self { skip: 0, limit: 100 }
    }
}

impl Paging {
    pub(crate) fn apply(&self, options: RequestOptions) -> RequestOptions {
        options.query("skip", self.skip).query("limit", self.limit)
    }
}

impl ApiClient {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }

    pub fn trips(&self) -> TripsApi<'_> {
        TripsApi::new(self)
    }

    pub fn members(&self) -> MembersApi<'_> {
        MembersApi::new(self)
    }

    pub fn messages(&self) -> MessagesApi<'_> {
        MessagesApi::new(self)
    }

    pub fn comments(&self) -> CommentsApi<'_> {
        CommentsApi::new(self)
    }
}
