//! HTTP boundary of the SSO service: request validation, mapping of auth
//! errors onto transport statuses, and server startup.

pub mod routes;
pub mod startup;
pub mod errors;
pub mod openapi;

pub use startup::run;
