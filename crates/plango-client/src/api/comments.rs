use plango_types::{Comment, CommentCreate};

use crate::api::Paging;
use crate::client::{ApiClient, RequestOptions};
use crate::error::ApiError;

pub struct CommentsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> CommentsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, trip_id: i64, paging: Paging) -> Result<Vec<Comment>, ApiError> {
        let options = paging.apply(RequestOptions::get());
        self.client
            .request(&format!("/trips/{trip_id}/comments"), options)
            .await
    }

    pub async fn add(&self, trip_id: i64, content: &str) -> Result<Comment, ApiError> {
        let options = RequestOptions::post().json(&CommentCreate {
            trip_id,
            content: content.to_string(),
        })?;
        self.client
            .request(&format!("/trips/{trip_id}/comments"), options)
            .await
    }

    pub async fn remove(&self, comment_id: i64) -> Result<(), ApiError> {
        self.client
            .request(
                &format!("/trips/comments/{comment_id}"),
                RequestOptions::delete(),
            )
            .await
    }
}
