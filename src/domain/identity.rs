/// Who is asking, as established by the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requester {
    Anonymous,
    Authenticated { user_id: i64 },
}

/// The shell account created for a guest purchase. The password behind
/// `password_hash` is discarded as soon as it is hashed.
#[derive(Debug, Clone)]
pub struct GuestProfile {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

/// The identity an order is committed under.
#[derive(Debug, Clone)]
pub enum Purchaser {
    Registered(i64),
    /// Nobody signed in, and the billing e-mail already owns an account.
    ReturningGuest(i64),
    /// Nobody signed in; the account is created by the commit unless one
    /// appeared for the e-mail in the meantime.
    Guest(GuestProfile),
}

impl Purchaser {
    pub fn is_guest(&self) -> bool {
        matches!(self, Purchaser::Guest(_) | Purchaser::ReturningGuest(_))
    }
}

/// Accounts are matched on the trimmed, lowercased address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Splits "First Middle Last" into ("First", "Middle Last").
pub fn split_name(full_name: &str) -> (String, String) {
    let trimmed = full_name.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (trimmed.to_string(), String::new()),
    }
}

/// Username stem derived from the e-mail local part: lowercase ASCII
/// alphanumerics and underscores, at most 20 characters.
pub fn username_stem(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let stem: String = local
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() {
                Some(c.to_ascii_lowercase())
            } else if c == '.' || c == '_' || c == '-' {
                Some('_')
            } else {
                None
            }
        })
        .take(20)
        .collect();
    if stem.is_empty() {
        "guest".to_string()
    } else {
        stem
    }
}
