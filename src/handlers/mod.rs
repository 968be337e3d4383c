pub mod magic_link_handlers;
pub mod post_handlers;

pub use magic_link_handlers::{request_magic_link, validate_magic_link};
pub use post_handlers::create_post_with_magic_link;
