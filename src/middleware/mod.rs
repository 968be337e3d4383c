pub mod magic_link_auth;

pub use magic_link_auth::{extract_bearer_token, magic_link_auth_middleware};
