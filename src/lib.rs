pub mod admin;
pub mod base;
pub mod service;

pub use admin::AdminRestClient;
pub use base::{
    Authenticator, BasicAuthenticator, BearerTokenAuthenticator, DetailedResponse, NoAuthAuthenticator,
    NoContent,
};
pub use service::{setup_local_tracing, setup_tracing, AdminConfig, AppError, AppResult};
