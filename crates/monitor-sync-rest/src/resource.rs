// crates/monitor-sync-rest/src/resource.rs
// ============================================================================
// Module: REST Resource
// Description: Typed CRUD client for one API collection.
// Purpose: Map entity operations onto the verbs each collection expects.
// Dependencies: crate::client, serde, serde_json
// ============================================================================

//! ## Overview
//! A [`RestResource`] pairs the shared [`RestClient`] with a collection path,
//! an entity type, and a [`RestMode`]. The remote API is not uniform: some
//! collections accept client-generated IDs through `PUT`, some only `POST`,
//! and one carries the entity name as a query parameter.
//! Invariants:
//! - Every decoded object passes [`RestObject::validate`].
//! - Create and update return the authoritative server copy; an empty update
//!   body triggers a follow-up `get_one`.
//! - `delete_by_id` treats 404 as success.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::marker::PhantomData;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::RestClient;
use crate::client::RestRequest;
use crate::context::RequestContext;
use crate::error::RestError;

// ============================================================================
// SECTION: Entity Contract
// ============================================================================

/// Entity exchanged with a REST collection.
pub trait RestObject: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Returns the entity ID; empty before the remote assigned one.
    fn id(&self) -> &str;

    /// Returns the name sent as query parameter in [`RestMode::NameQueryParameter`].
    fn query_name(&self) -> Option<&str> {
        None
    }

    /// Checks an object decoded from a response.
    ///
    /// # Errors
    /// Returns a description of the first inconsistency found.
    fn validate(&self) -> Result<(), String> {
        if self.id().trim().is_empty() {
            return Err("id is missing".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Modes
// ============================================================================

/// How create and update map onto HTTP verbs for a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestMode {
    /// `POST /path` creates, `PUT /path/{id}` updates.
    #[default]
    PostCreatePutUpdate,
    /// `PUT /path/{id}` creates and updates with client-generated IDs.
    PutCreatePutUpdate,
    /// `POST /path` creates, `POST /path/{id}` updates.
    PostCreatePostUpdate,
    /// Like [`RestMode::PostCreatePutUpdate`] but the body is empty and the
    /// name travels in the `name` query parameter.
    NameQueryParameter,
}

// ============================================================================
// SECTION: Resource Client
// ============================================================================

/// Typed client for one collection.
#[derive(Debug)]
pub struct RestResource<'a, T> {
    /// Shared transport.
    client: &'a RestClient,
    /// Collection path.
    path: &'static str,
    /// Verb mapping.
    mode: RestMode,
    /// Entity type marker.
    entity: PhantomData<fn() -> T>,
}

impl<T> Clone for RestResource<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RestResource<'_, T> {}

impl<'a, T: RestObject> RestResource<'a, T> {
    /// Binds a collection path and mode to the client.
    #[must_use]
    pub const fn new(client: &'a RestClient, path: &'static str, mode: RestMode) -> Self {
        Self {
            client,
            path,
            mode,
            entity: PhantomData,
        }
    }

    /// Returns the collection path.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// Returns the verb mapping.
    #[must_use]
    pub const fn mode(&self) -> RestMode {
        self.mode
    }

    /// Fetches one entity.
    ///
    /// # Errors
    /// Returns [`RestError::NotFound`] on 404 and other [`RestError`]s on
    /// transport, status, or decoding failure.
    pub fn get_one(&self, id: &str, ctx: &RequestContext) -> Result<T, RestError> {
        let request = RestRequest::new(Method::GET, self.path).with_id(id);
        let body = self.client.execute(&request, ctx)?;
        decode_one(&body)
    }

    /// Fetches every entity of the collection in server order.
    ///
    /// # Errors
    /// Returns [`RestError`] on transport, status, or decoding failure.
    pub fn get_all(&self, ctx: &RequestContext) -> Result<Vec<T>, RestError> {
        let request = RestRequest::new(Method::GET, self.path);
        let body = self.client.execute(&request, ctx)?;
        let objects: Vec<T> =
            serde_json::from_slice(&body).map_err(|err| RestError::Decode(err.to_string()))?;
        for object in &objects {
            object.validate().map_err(RestError::InvalidObject)?;
        }
        Ok(objects)
    }

    /// Creates an entity and returns the server copy.
    ///
    /// # Errors
    /// Returns [`RestError`] on encoding, transport, status, or decoding failure.
    pub fn create(&self, object: &T, ctx: &RequestContext) -> Result<T, RestError> {
        debug!(path = self.path, mode = ?self.mode, "creating entity");
        match self.mode {
            RestMode::PutCreatePutUpdate => {
                let request = RestRequest::new(Method::PUT, self.path)
                    .with_id(object.id())
                    .with_body(encode(object)?);
                self.exchange(&request, object.id(), ctx)
            }
            RestMode::PostCreatePutUpdate | RestMode::PostCreatePostUpdate => {
                let request = RestRequest::new(Method::POST, self.path).with_body(encode(object)?);
                let body = self.client.execute(&request, ctx)?;
                decode_one(&body)
            }
            RestMode::NameQueryParameter => {
                let name = required_query_name(object)?;
                let request = RestRequest::new(Method::POST, self.path).with_query("name", name);
                let body = self.client.execute(&request, ctx)?;
                decode_one(&body)
            }
        }
    }

    /// Updates an existing entity and returns the server copy.
    ///
    /// # Errors
    /// Returns [`RestError`] on encoding, transport, status, or decoding failure.
    pub fn update(&self, object: &T, ctx: &RequestContext) -> Result<T, RestError> {
        debug!(path = self.path, id = object.id(), mode = ?self.mode, "updating entity");
        let request = match self.mode {
            RestMode::PutCreatePutUpdate | RestMode::PostCreatePutUpdate => {
                RestRequest::new(Method::PUT, self.path)
                    .with_id(object.id())
                    .with_body(encode(object)?)
            }
            RestMode::PostCreatePostUpdate => RestRequest::new(Method::POST, self.path)
                .with_id(object.id())
                .with_body(encode(object)?),
            RestMode::NameQueryParameter => RestRequest::new(Method::PUT, self.path)
                .with_id(object.id())
                .with_query("name", required_query_name(object)?),
        };
        self.exchange(&request, object.id(), ctx)
    }

    /// Deletes an entity; a missing entity counts as deleted.
    ///
    /// # Errors
    /// Returns [`RestError`] on transport or status failure other than 404.
    pub fn delete_by_id(&self, id: &str, ctx: &RequestContext) -> Result<(), RestError> {
        debug!(path = self.path, id, "deleting entity");
        let request = RestRequest::new(Method::DELETE, self.path).with_id(id);
        match self.client.execute(&request, ctx) {
            Ok(_) | Err(RestError::NotFound) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Sends a write addressed by ID, falling back to `get_one` on an empty body.
    fn exchange(
        &self,
        request: &RestRequest<'_>,
        id: &str,
        ctx: &RequestContext,
    ) -> Result<T, RestError> {
        let body = self.client.execute(request, ctx)?;
        if is_blank(&body) {
            return self.get_one(id, ctx);
        }
        decode_one(&body)
    }
}

// ============================================================================
// SECTION: Codec Helpers
// ============================================================================

/// Serializes a request body.
fn encode<T: Serialize>(object: &T) -> Result<Vec<u8>, RestError> {
    serde_json::to_vec(object).map_err(|err| RestError::Encode(err.to_string()))
}

/// Decodes and validates a single object.
fn decode_one<T: RestObject>(body: &[u8]) -> Result<T, RestError> {
    if is_blank(body) {
        return Err(RestError::Decode("empty response body".to_string()));
    }
    let object: T =
        serde_json::from_slice(body).map_err(|err| RestError::Decode(err.to_string()))?;
    object.validate().map_err(RestError::InvalidObject)?;
    Ok(object)
}

/// Returns true when a body holds only whitespace.
fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

/// Returns the query name or fails when the entity has none.
fn required_query_name<T: RestObject>(object: &T) -> Result<&str, RestError> {
    object
        .query_name()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| RestError::Encode("entity name is required as query parameter".to_string()))
}
