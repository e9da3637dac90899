use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use plango_types::{
    Comment, LoginResponse, MemberRole, Message, TokenResponse, Trip, TripCreate, TripMember,
    TripUpdate, User, UserUpdate,
};

use crate::error::{StubError, StubResult};

pub const INVALID_CREDENTIALS: &str = "Could not validate credentials";
pub const INVALID_REFRESH: &str = "Invalid or expired refresh token";

/// Oldest recorded requests are dropped past this many.
pub const MAX_RECORDED_REQUESTS: usize = 1024;

/// One request as seen by the stub, for assertions in tests.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
}

/// Shared state of the stub backend plus knobs for driving the token
/// lifecycle from tests.
#[derive(Clone, Default)]
pub struct StubState {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    db: Mutex<Db>,
    refresh_calls: AtomicUsize,
    fail_refresh: AtomicBool,
    revoke_refreshed_access: AtomicBool,
    requests: Mutex<VecDeque<RecordedRequest>>,
}

struct StoredUser {
    user: User,
    password: String,
}

#[derive(Default)]
struct Db {
    next_id: i64,
    next_token: u64,
    users: BTreeMap<i64, StoredUser>,
    access_tokens: HashMap<String, i64>,
    refresh_tokens: HashMap<String, i64>,
    trips: BTreeMap<i64, Trip>,
    members: Vec<TripMember>,
    messages: Vec<Message>,
    comments: Vec<Comment>,
}

impl Db {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn issue_tokens(&mut self, userId: i64) -> (String, String) {
        self.next_token += 1;
        let access = format!("access-{}", self.next_token);
        let refresh = format!("refresh-{}", self.next_token);
        self.access_tokens.insert(access.clone(), userId);
        self.refresh_tokens.insert(refresh.clone(), userId);
        (access, refresh)
    }

    fn user(&self, userId: i64) -> StubResult<&User> {
        self.users
            .get(&userId)
            .map(|stored| &stored.user)
            .ok_or_else(|| StubError::not_found("User not found"))
    }

    fn trip(&self, tripId: i64) -> StubResult<&Trip> {
        self.trips
            .get(&tripId)
            .ok_or_else(|| StubError::not_found("Trip not found"))
    }

    fn membership(&self, tripId: i64, userId: i64) -> Option<&TripMember> {
        self.members
            .iter()
            .find(|m| m.trip_id == tripId && m.user_id == userId)
    }

    fn require_member(&self, tripId: i64, userId: i64) -> StubResult<()> {
        self.trip(tripId)?;
        match self.membership(tripId, userId) {
            Some(_) => Ok(()),
            None => Err(StubError::forbidden("You are not a member of this trip")),
        }
    }

    fn is_organizer(&self, tripId: i64, userId: i64) -> bool {
        self.membership(tripId, userId)
            .is_some_and(|m| m.role == MemberRole::Organizer)
    }

    fn add_member(&mut self, tripId: i64, userId: i64, role: MemberRole) -> TripMember {
        let member = TripMember {
            id: self.next_id(),
            user_id: userId,
            trip_id: tripId,
            role,
            joined_at: Utc::now(),
        };
        self.members.push(member.clone());
        member
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|stored| stored.user.email == email && Some(stored.user.id) != except)
    }
}

impl StubState {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- test controls ----

    /// Invalidates every access token; refresh tokens stay valid.
    pub fn expire_access_tokens(&self) {
        self.inner.db.lock().access_tokens.clear();
    }

    /// Makes `/auth/refresh` reject every token while set.
    pub fn fail_refresh(&self, fail: bool) {
        self.inner.fail_refresh.store(fail, Ordering::SeqCst);
    }

    /// Makes `/auth/refresh` hand out access tokens that are already invalid.
    pub fn revoke_refreshed_access_tokens(&self, revoke: bool) {
        self.inner.revoke_refreshed_access.store(revoke, Ordering::SeqCst);
    }

    pub fn refresh_calls(&self) -> usize {
        self.inner.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.inner.requests.lock().iter().cloned().collect()
    }

    pub(crate) fn record(&self, request: RecordedRequest) {
        let mut requests = self.inner.requests.lock();
        if requests.len() == MAX_RECORDED_REQUESTS {
            requests.pop_front();
        }
        requests.push_back(request);
    }

    // ---- auth ----

    pub(crate) fn authenticate(&self, accessToken: &str) -> Option<i64> {
        self.inner.db.lock().access_tokens.get(accessToken).copied()
    }

    pub(crate) fn register(
        &self,
        name: Option<String>,
        email: &str,
        password: &str,
    ) -> StubResult<LoginResponse> {
        let mut db = self.inner.db.lock();
        if db.email_taken(email, None) {
            return Err(StubError::bad_request("User with this email already exists"));
        }

        let id = db.next_id();
        let user = User {
            id,
            name,
            email: email.to_string(),
            avatar_url: None,
            bio: None,
            created_at: Some(Utc::now()),
        };
        db.users.insert(
            id,
            StoredUser {
                user: user.clone(),
                password: password.to_string(),
            },
        );

        let (access, refresh) = db.issue_tokens(id);
        Ok(login_response(access, refresh, user))
    }

    pub(crate) fn login(&self, email: &str, password: &str) -> StubResult<LoginResponse> {
        let mut db = self.inner.db.lock();
        let user = db
            .users
            .values()
            .find(|stored| stored.user.email == email && stored.password == password)
            .map(|stored| stored.user.clone())
            .ok_or_else(|| StubError::unauthorized("Invalid email or password"))?;

        let (access, refresh) = db.issue_tokens(user.id);
        Ok(login_response(access, refresh, user))
    }

    /// Rotates the refresh token: the presented one stops working.
    pub(crate) fn refresh(&self, refreshToken: &str) -> StubResult<TokenResponse> {
        self.inner.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_refresh.load(Ordering::SeqCst) {
            return Err(StubError::unauthorized(INVALID_REFRESH));
        }

        let mut db = self.inner.db.lock();
        let userId = db
            .refresh_tokens
            .remove(refreshToken)
            .ok_or_else(|| StubError::unauthorized(INVALID_REFRESH))?;
        db.user(userId)?;

        let (access, refresh) = db.issue_tokens(userId);
        if self.inner.revoke_refreshed_access.load(Ordering::SeqCst) {
            db.access_tokens.remove(&access);
        }
        Ok(TokenResponse {
            access_token: access,
            refresh_token: refresh,
            token_type: "bearer".into(),
        })
    }

    pub(crate) fn logout(&self, refreshToken: &str) -> StubResult<()> {
        let mut db = self.inner.db.lock();
        match db.refresh_tokens.remove(refreshToken) {
            Some(_) => Ok(()),
            None => Err(StubError::bad_request("Refresh token not found")),
        }
    }

    pub(crate) fn revoke_all(&self, userId: i64) -> usize {
        let mut db = self.inner.db.lock();
        let before = db.refresh_tokens.len();
        db.refresh_tokens.retain(|_, owner| *owner != userId);
        before - db.refresh_tokens.len()
    }

    // ---- users ----

    pub(crate) fn user(&self, userId: i64) -> StubResult<User> {
        self.inner.db.lock().user(userId).cloned()
    }

    pub(crate) fn update_user(&self, userId: i64, update: UserUpdate) -> StubResult<User> {
        let mut db = self.inner.db.lock();
        if let Some(email) = &update.email {
            if db.email_taken(email, Some(userId)) {
                return Err(StubError::bad_request("Email already taken"));
            }
        }

        let stored = db
            .users
            .get_mut(&userId)
            .ok_or_else(|| StubError::not_found("User not found"))?;
        let user = &mut stored.user;
        if let Some(name) = update.name {
            user.name = Some(name);
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(bio) = update.bio {
            user.bio = Some(bio);
        }
        if let Some(avatarUrl) = update.avatar_url {
            user.avatar_url = Some(avatarUrl);
        }
        Ok(user.clone())
    }

    pub(crate) fn delete_user(&self, userId: i64) -> StubResult<()> {
        let mut db = self.inner.db.lock();
        db.users
            .remove(&userId)
            .ok_or_else(|| StubError::not_found("User not found"))?;
        db.access_tokens.retain(|_, owner| *owner != userId);
        db.refresh_tokens.retain(|_, owner| *owner != userId);
        db.members.retain(|m| m.user_id != userId);
        Ok(())
    }

    // ---- trips ----

    pub(crate) fn create_trip(&self, userId: i64, create: TripCreate) -> StubResult<Trip> {
        if create.title.trim().is_empty() {
            return Err(StubError::validation("title", "Title must not be empty"));
        }

        let mut db = self.inner.db.lock();
        let trip = Trip {
            id: db.next_id(),
            title: create.title,
            description: create.description,
            destination: create.destination,
            start_date: create.start_date,
            end_date: create.end_date,
            budget_total: create.budget_total,
            created_at: Utc::now(),
            creator_id: userId,
        };
        db.trips.insert(trip.id, trip.clone());
        db.add_member(trip.id, userId, MemberRole::Organizer);
        Ok(trip)
    }

    pub(crate) fn user_trips(&self, userId: i64, skip: usize, limit: usize) -> Vec<Trip> {
        let db = self.inner.db.lock();
        db.trips
            .values()
            .filter(|trip| db.membership(trip.id, userId).is_some())
            .skip(skip)
            .take(limit)
            .cloned()
            .collect()
    }

    pub(crate) fn trip(&self, userId: i64, tripId: i64) -> StubResult<Trip> {
        let db = self.inner.db.lock();
        let trip = db.trip(tripId)?.clone();
        if db.membership(tripId, userId).is_none() {
            return Err(StubError::not_found("Access denied"));
        }
        Ok(trip)
    }

    pub(crate) fn update_trip(&self, userId: i64, tripId: i64, update: TripUpdate) -> StubResult<Trip> {
        let mut db = self.inner.db.lock();
        db.trip(tripId)?;
        if !db.is_organizer(tripId, userId) {
            return Err(StubError::bad_request("Permission denied"));
        }

        let trip = db
            .trips
            .get_mut(&tripId)
            .ok_or_else(|| StubError::not_found("Trip not found"))?;
        if let Some(title) = update.title {
            trip.title = title;
        }
        if let Some(description) = update.description {
            trip.description = Some(description);
        }
        if let Some(destination) = update.destination {
            trip.destination = destination;
        }
        if let Some(startDate) = update.start_date {
            trip.start_date = Some(startDate);
        }
        if let Some(endDate) = update.end_date {
            trip.end_date = Some(endDate);
        }
        if let Some(budget) = update.budget_total {
            trip.budget_total = Some(budget);
        }
        Ok(trip.clone())
    }

    pub(crate) fn delete_trip(&self, userId: i64, tripId: i64) -> StubResult<()> {
        let mut db = self.inner.db.lock();
        db.trip(tripId)?;
        if !db.is_organizer(tripId, userId) {
            return Err(StubError::not_found("Only trip organizer can delete the trip"));
        }
        db.trips.remove(&tripId);
        db.members.retain(|m| m.trip_id != tripId);
        db.messages.retain(|m| m.trip_id != tripId);
        db.comments.retain(|c| c.trip_id != tripId);
        Ok(())
    }

    // ---- members ----

    pub(crate) fn join_trip(&self, userId: i64, tripId: i64) -> StubResult<TripMember> {
        let mut db = self.inner.db.lock();
        db.trip(tripId)?;
        if db.membership(tripId, userId).is_some() {
            return Err(StubError::bad_request("You are already a member of this trip"));
        }
        Ok(db.add_member(tripId, userId, MemberRole::Member))
    }

    pub(crate) fn trip_members(&self, userId: i64, tripId: i64) -> StubResult<Vec<TripMember>> {
        let db = self.inner.db.lock();
        db.trip(tripId)?;
        if db.membership(tripId, userId).is_none() {
            return Err(StubError::not_found("Access denied"));
        }
        Ok(db
            .members
            .iter()
            .filter(|m| m.trip_id == tripId)
            .cloned()
            .collect())
    }

    pub(crate) fn update_member_role(
        &self,
        organizerId: i64,
        tripId: i64,
        memberUserId: i64,
        newRole: &str,
    ) -> StubResult<TripMember> {
        let mut db = self.inner.db.lock();
        if !db.is_organizer(tripId, organizerId) {
            return Err(StubError::bad_request("Permission denied"));
        }
        let role = MemberRole::from(newRole);
        if matches!(role, MemberRole::Other(_)) {
            return Err(StubError::bad_request(
                "Invalid role. Must be 'organizer', 'member', or 'viewer'",
            ));
        }

        let member = db
            .members
            .iter_mut()
            .find(|m| m.trip_id == tripId && m.user_id == memberUserId)
            .ok_or_else(|| StubError::bad_request("Member not found"))?;
        if member.role == MemberRole::Organizer {
            return Err(StubError::bad_request("Cannot change organizer role"));
        }
        member.role = role;
        Ok(member.clone())
    }

    /// Removing yourself leaves the trip; anyone else needs an organizer.
    pub(crate) fn remove_member(&self, userId: i64, tripId: i64, memberUserId: i64) -> StubResult<()> {
        let mut db = self.inner.db.lock();
        if memberUserId != userId && !db.is_organizer(tripId, userId) {
            return Err(StubError::bad_request("Permission denied"));
        }

        let member = db.membership(tripId, memberUserId).ok_or_else(|| {
            if memberUserId == userId {
                StubError::bad_request("You are not a member of this trip")
            } else {
                StubError::bad_request("Member not found")
            }
        })?;
        if member.role == MemberRole::Organizer {
            return Err(StubError::bad_request(if memberUserId == userId {
                "Trip organizer cannot leave the trip"
            } else {
                "Cannot remove trip organizer"
            }));
        }

        db.members
            .retain(|m| !(m.trip_id == tripId && m.user_id == memberUserId));
        Ok(())
    }

    // ---- messages and comments ----

    pub(crate) fn send_message(&self, userId: i64, tripId: i64, content: String) -> StubResult<Message> {
        let mut db = self.inner.db.lock();
        db.require_member(tripId, userId)
            .map_err(|e| StubError::bad_request(e.body_text()))?;
        let message = Message {
            id: db.next_id(),
            user_id: userId,
            trip_id: tripId,
            content,
            created_at: Utc::now(),
        };
        db.messages.push(message.clone());
        Ok(message)
    }

    pub(crate) fn trip_messages(
        &self,
        userId: i64,
        tripId: i64,
        skip: usize,
        limit: usize,
    ) -> StubResult<Vec<Message>> {
        let db = self.inner.db.lock();
        db.require_member(tripId, userId)
            .map_err(|e| StubError::not_found(e.body_text()))?;
        Ok(db
            .messages
            .iter()
            .filter(|m| m.trip_id == tripId)
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    pub(crate) fn add_comment(&self, userId: i64, tripId: i64, content: String) -> StubResult<Comment> {
        let mut db = self.inner.db.lock();
        db.require_member(tripId, userId)
            .map_err(|e| StubError::bad_request(e.body_text()))?;
        let comment = Comment {
            id: db.next_id(),
            user_id: userId,
            trip_id: tripId,
            content,
            created_at: Utc::now(),
        };
        db.comments.push(comment.clone());
        Ok(comment)
    }

    pub(crate) fn trip_comments(
        &self,
        userId: i64,
        tripId: i64,
        skip: usize,
        limit: usize,
    ) -> StubResult<Vec<Comment>> {
        let db = self.inner.db.lock();
        db.require_member(tripId, userId)
            .map_err(|e| StubError::not_found(e.body_text()))?;
        Ok(db
            .comments
            .iter()
            .filter(|c| c.trip_id == tripId)
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    pub(crate) fn delete_comment(&self, userId: i64, commentId: i64) -> StubResult<()> {
        let mut db = self.inner.db.lock();
        let index = db
            .comments
            .iter()
            .position(|c| c.id == commentId)
            .ok_or_else(|| StubError::not_found("Comment not found"))?;
        if db.comments[index].user_id != userId {
            return Err(StubError::not_found("You can only delete your own comments"));
        }
        db.comments.remove(index);
        Ok(())
    }
}

fn login_response(access: String, refresh: String, user: User) -> LoginResponse {
    LoginResponse {
        access_token: access,
        refresh_token: refresh,
        token_type: "bearer".into(),
        user,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(path: String) -> RecordedRequest {
        RecordedRequest {
            method: "GET".into(),
            path,
            authorization: None,
        }
    }

    #[test]
    fn recorder_keeps_only_the_newest_requests() {
        let state = StubState::new();
        for i in 0..MAX_RECORDED_REQUESTS + 5 {
            state.record(request(format!("/trips/{i}")));
        }

        let recorded = state.recorded_requests();
        assert_eq!(recorded.len(), MAX_RECORDED_REQUESTS);
        assert_eq!(recorded[0].path, "/trips/5");
        assert_eq!(
            recorded.last().map(|r| r.path.as_str()),
            Some(format!("/trips/{}", MAX_RECORDED_REQUESTS + 4).as_str())
        );
    }

    #[test]
    fn revoked_refresh_issues_unusable_access_token() {
        let state = StubState::new();
        let login = state.register(None, "gil@example.com", "secret123").unwrap();
        state.revoke_refreshed_access_tokens(true);

        let tokens = state.refresh(&login.refresh_token).unwrap();
        assert_eq!(state.authenticate(&tokens.access_token), None);
        assert_eq!(state.refresh_calls(), 1);
    }
}
