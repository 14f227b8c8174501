//! Data Transfer Objects for Web API.

pub mod form;
pub mod request;

pub use form::FormData;
pub use request::*;
