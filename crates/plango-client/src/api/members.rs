use plango_types::{JoinRequest, MemberRole, TripMember};

use crate::client::{ApiClient, RequestOptions};
use crate::error::ApiError;

pub struct MembersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> MembersApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn join(&self, trip_id: i64, request: &JoinRequest) -> Result<TripMember, ApiError> {
        let options = RequestOptions::post().json(request)?;
        self.client
            .request(&format!("/trips/{trip_id}/join"), options)
            .await
    }

    pub async fn list(&self, trip_id: i64) -> Result<Vec<TripMember>, ApiError> {
        self.client
            .request(&format!("/trips/{trip_id}/members"), RequestOptions::get())
            .await
    }

    /// The backend reads the new role from the `new_role` query parameter.
    pub async fn update_role(
        &self,
        trip_id: i64,
        member_id: i64,
        role: &MemberRole,
    ) -> Result<TripMember, ApiError> {
        let options = RequestOptions::patch().query("new_role", role);
        self.client
            .request(&format!("/trips/{trip_id}/members/{member_id}"), options)
            .await
    }

    /// Removes a member; passing your own user id leaves the trip.
    pub async fn remove(&self, trip_id: i64, member_id: i64) -> Result<(), ApiError> {
        self.client
            .request(
                &format!("/trips/{trip_id}/members/{member_id}"),
                RequestOptions::delete(),
            )
            .await
    }
}
