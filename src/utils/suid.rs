//! Session unique identifiers for conversations.

use uuid::Uuid;

/// New conversation id: a random UUID rendered as 32 lowercase hex digits
pub fn get_suid() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Accepts both the 32 digit form and the hyphenated UUID form
pub fn check_suid(suid: &str) -> bool {
    match suid.len() {
        32 => suid
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)),
        36 => Uuid::parse_str(suid).is_ok(),
        _ => false,
    }
}
