use chrono::NaiveDate;
use plango_types::{Trip, TripCreate, TripUpdate};

use crate::api::Paging;
use crate::client::{ApiClient, RequestOptions};
use crate::error::ApiError;

/// Query string for `GET /trips`. An empty query sends no parameters.
#[derive(Clone, Debug, Default)]
pub struct TripQuery {
    pub paging: Option<Paging>,
    pub extra: Vec<(String, String)>,
}

impl TripQuery {
    pub fn paged(paging: Paging) -> Self {
        Self {
            paging: Some(paging),
            extra: Vec::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.extra.push((key.to_string(), value.to_string()));
        self
    }
}

pub struct TripsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> TripsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &TripQuery) -> Result<Vec<Trip>, ApiError> {
        let mut options = RequestOptions::get();
        if let Some(paging) = &query.paging {
            options = paging.apply(options);
        }
        for (key, value) in &query.extra {
            options = options.query(key, value);
        }
        self.client.request("/trips", options).await
    }

    pub async fn create(&self, trip: &TripCreate) -> Result<Trip, ApiError> {
        let options = RequestOptions::post().json(trip)?;
        self.client.request("/trips", options).await
    }

    pub async fn get(&self, trip_id: i64) -> Result<Trip, ApiError> {
        self.client
            .request(&format!("/trips/{trip_id}"), RequestOptions::get())
            .await
    }

    pub async fn update(&self, trip_id: i64, update: &TripUpdate) -> Result<Trip, ApiError> {
        let options = RequestOptions::put().json(update)?;
        self.client
            .request(&format!("/trips/{trip_id}"), options)
            .await
    }

    pub async fn remove(&self, trip_id: i64) -> Result<(), ApiError> {
        self.client
            .request(&format!("/trips/{trip_id}"), RequestOptions::delete())
            .await
    }

    /// Trips that ended before `today`, most recently finished first.
    pub async fn archived(&self, query: &TripQuery, today: NaiveDate) -> Result<Vec<Trip>, ApiError> {
        let mut trips: Vec<Trip> = self
            .list(query)
            .await?
            .into_iter()
            .filter(|trip| trip.is_archived(today))
            .collect();
        trips.sort_by(|a, b| b.end_date.cmp(&a.end_date));
        Ok(trips)
    }
}
