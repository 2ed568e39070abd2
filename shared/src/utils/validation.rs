//! Input validation helpers shared by the services and the HTTP layer

use once_cell::sync::Lazy;
use regex::Regex;

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 12;

/// Characters that satisfy the "special character" rule
pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Substrings that make a password trivially guessable
const COMMON_PATTERNS: [&str; 4] = ["123456", "password", "qwerty", "abc123"];

/// Disposable mailbox providers that may not register
pub const BLOCKED_EMAIL_DOMAINS: [&str; 4] = [
    "10minutemail.com",
    "tempmail.org",
    "guerrillamail.com",
    "mailinator.com",
];

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

static USERNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_.-]{3,150}$").expect("valid username regex"));

static WEBSITE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[a-zA-Z0-9-]+(\.[a-zA-Z0-9-]+)+(:[0-9]{1,5})?(/\S*)?$")
        .expect("valid website regex")
});

/// Lowercase and trim an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Lowercase and trim a username
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 254 && EMAIL_REGEX.is_match(email)
}

/// False for addresses hosted by a blocked disposable provider
pub fn is_email_domain_allowed(email: &str) -> bool {
    match email.rsplit_once('@') {
        Some((_, domain)) => {
            let domain = domain.to_lowercase();
            !BLOCKED_EMAIL_DOMAINS.contains(&domain.as_str())
        }
        None => false,
    }
}

/// Usernames are 3 to 150 chars of lowercase letters, digits, `_`, `.` or `-`
pub fn is_valid_username(username: &str) -> bool {
    USERNAME_REGEX.is_match(username)
}

/// Absolute http(s) URL with a dotted host
pub fn is_valid_website(url: &str) -> bool {
    url.len() <= 200 && WEBSITE_REGEX.is_match(url)
}

/// Check a password against the strength policy.
///
/// Returns one message per failed rule; an empty vector means the password
/// is acceptable.
pub fn validate_password_strength(password: &str) -> Vec<String> {
    let mut errors = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        errors.push("Password must contain at least one uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        errors.push("Password must contain at least one lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one digit".to_string());
    }
    if !password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)) {
        errors.push("Password must contain at least one special character".to_string());
    }

    let lowered = password.to_lowercase();
    if COMMON_PATTERNS.iter().any(|pattern| lowered.contains(pattern)) {
        errors.push("Password contains a common pattern".to_string());
    }

    errors
}

/// Deterministic alternatives for a taken username: `base1`, `base2`, ...
///
/// Callers drop the ones that are also taken.
pub fn username_candidates(base: &str, count: usize) -> Vec<String> {
    let base = normalize_username(base);
    (1..=count).map(|i| format!("{}{}", base, i)).collect()
}
