//! Request extractors.

mod body;
mod client;
mod id;
pub use body::{JsonBody, Params};
pub use client::{Client, Guard};
pub use id::RecordId;
