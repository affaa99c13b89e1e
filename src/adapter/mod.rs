pub(crate) mod base_client;
pub mod cache;
pub mod notification;
pub mod processor;
pub mod repository;

pub use base_client::{BaseClientError, BaseClientErrorReason};
