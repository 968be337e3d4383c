pub mod email_service;
pub mod magic_link_service;
pub mod notification_service;
pub mod post_service;
pub mod token_service;

pub use email_service::{
    create_email_service, EmailError, EmailService, MagicLinkEmail, MockEmailService,
    NewPostNotificationEmail, SmtpEmailService,
};
pub use magic_link_service::{MagicLinkError, MagicLinkService, ValidatedMagicLink};
pub use notification_service::{NewPostEvent, NotificationError, NotificationService};
pub use post_service::{CreatePostRequest, PostService, PostServiceError};
pub use token_service::{TokenCodec, TokenError, TokenPurpose};
