use plango_types::{Message, MessageCreate};

use crate::api::Paging;
use crate::client::{ApiClient, RequestOptions};
use crate::error::ApiError;

pub struct MessagesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> MessagesApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, trip_id: i64, paging: Paging) -> Result<Vec<Message>, ApiError> {
        let options = paging.apply(RequestOptions::get());
        self.client
            .request(&format!("/trips/{trip_id}/messages"), options)
            .await
    }

    pub async fn send(&self, trip_id: i64, content: &str) -> Result<Message, ApiError> {
        let options = RequestOptions::post().json(&MessageCreate {
            trip_id,
            content: content.to_string(),
        })?;
        self.client
            .request(&format!("/trips/{trip_id}/messages"), options)
            .await
    }
}
