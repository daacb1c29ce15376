//! Business logic layer.
//!
//! The upload queue and the batch converter. Called by the `commands` layer;
//! delegates HTTP interactions to the `api` layer and persistence to the
//! `storage` layer.

pub mod batch;
pub mod upload_queue;
