//! # Quill Shared
//!
//! Wire types shared between the API server and its clients: request bodies
//! and the response projections, all camelCase on the wire.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
