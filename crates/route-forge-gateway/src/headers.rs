//! Identity-propagation headers the platform attaches to authenticated
//! requests.

pub const USER_AUTH_ID: &str = "X-Forge-User-Auth-Id";
pub const USER_EMAIL: &str = "X-Forge-User-Email";
pub const USER_NAME: &str = "X-Forge-User-Name";
pub const USER_GIVEN_NAME: &str = "X-Forge-User-Given-Name";
pub const USER_FAMILY_NAME: &str = "X-Forge-User-Family-Name";

/// All user headers, in the order they are emitted.
pub const USER_HEADERS: [&str; 5] = [
    USER_AUTH_ID,
    USER_EMAIL,
    USER_NAME,
    USER_GIVEN_NAME,
    USER_FAMILY_NAME,
];

pub fn user_headers() -> Vec<String> {
    USER_HEADERS.iter().map(|h| h.to_string()).collect()
}
