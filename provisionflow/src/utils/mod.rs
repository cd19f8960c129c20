//! Small helpers shared by the resource pipelines.

mod tokens;

pub use tokens::{client_token, CLIENT_TOKEN_LEN};
