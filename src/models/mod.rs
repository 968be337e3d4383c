pub mod board;
pub mod magic_link;
pub mod post;
pub mod role;
pub mod settings;
pub mod user;
pub mod vote;

pub use board::{Board, NewBoard};
pub use magic_link::{MagicLink, MagicLinkSession, NewMagicLink};
pub use post::{NewPost, Post, PostWithVoters};
pub use role::Role;
pub use settings::SiteSettings;
pub use user::{NewAnonymousUser, User};
pub use vote::{Vote, VoteSummary, VoterVote};
