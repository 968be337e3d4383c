use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use sha2::{Digest, Sha256};
use uuid::Uuid;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

const SLUG_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";
pub const SLUG_ID_LEN: usize = 20;
const USERNAME_MAX_LEN: usize = 30;

/// `local@domain.tld` shape check; no deliverability guarantees.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Parses a board/link identifier, returning it in canonical hyphenated form.
pub fn parse_uuid(value: &str) -> Option<Uuid> {
    Uuid::parse_str(value.trim()).ok()
}

pub fn generate_slug_id() -> String {
    let mut rng = rand::thread_rng();
    (0..SLUG_ID_LEN)
        .map(|_| SLUG_ID_ALPHABET[rng.gen_range(0..SLUG_ID_ALPHABET.len())] as char)
        .collect()
}

/// Lowercased, hyphen-joined words of `title`, with punctuation dropped.
pub fn slugify(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    kept.split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

pub fn post_slug(title: &str, slug_id: &str) -> String {
    let base = slugify(title);
    if base.is_empty() {
        slug_id.to_string()
    } else {
        format!("{}-{}", base, slug_id)
    }
}

pub fn sanitise_username(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .take(USERNAME_MAX_LEN)
        .collect::<String>()
        .to_lowercase();

    if cleaned.is_empty() {
        "user".to_string()
    } else {
        cleaned
    }
}

/// Base username for an email: its sanitised local part.
pub fn username_base(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    sanitise_username(&local.chars().take(USERNAME_MAX_LEN).collect::<String>())
}

pub fn username_candidate(base: &str) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("{}_{:04}", base, suffix)
}

pub fn gravatar_url(email: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.trim().to_lowercase().as_bytes());
    format!("https://www.gravatar.com/avatar/{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("ab.com"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@@b.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn slugify_drops_punctuation_and_collapses_space() {
        assert_eq!(slugify("Add dark mode"), "add-dark-mode");
        assert_eq!(slugify("  Fix: crash   on   save!! "), "fix-crash-on-save");
        assert_eq!(slugify("snake_case stays"), "snake_case-stays");
        assert_eq!(slugify("?!"), "");
    }

    #[test]
    fn post_slug_appends_identifier() {
        let slug_id = generate_slug_id();
        assert_eq!(slug_id.len(), SLUG_ID_LEN);
        assert!(slug_id
            .bytes()
            .all(|b| SLUG_ID_ALPHABET.contains(&b)));

        let slug = post_slug("Add dark mode", &slug_id);
        assert_eq!(slug, format!("add-dark-mode-{}", slug_id));
        assert_eq!(post_slug("!!!", "abc"), "abc");
    }

    #[test]
    fn usernames_come_from_local_part() {
        assert_eq!(username_base("Jane.Doe@example.com"), "jane.doe");
        assert_eq!(username_base("jane+tag@example.com"), "janetag");
        assert_eq!(username_base("++@example.com"), "user");
        assert_eq!(username_base(&format!("{}@example.com", "a".repeat(50))).len(), 30);

        let candidate = username_candidate("jane");
        assert!(candidate.starts_with("jane_"));
        assert_eq!(candidate.len(), "jane_".len() + 4);
    }

    #[test]
    fn gravatar_is_case_insensitive() {
        assert_eq!(gravatar_url("A@B.com"), gravatar_url("a@b.com"));
        assert!(gravatar_url("a@b.com").starts_with("https://www.gravatar.com/avatar/"));
    }

    #[test]
    fn uuid_parsing() {
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid(&id.to_string()), Some(id));
        assert_eq!(parse_uuid("not-a-uuid"), None);
    }
}
