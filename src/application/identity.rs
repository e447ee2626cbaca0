use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::domain::errors::DomainError;
use crate::domain::identity::{normalize_email, split_name, username_stem, GuestProfile};

const GUEST_PASSWORD_LEN: usize = 32;
const USERNAME_SUFFIX_LEN: usize = 6;

fn random_alphanumeric(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

pub fn hash_password(password: &str) -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DomainError::Internal(format!("password hashing failed: {e}")))
}

/// Builds the shell account used when nobody is signed in. The generated
/// password only ever exists inside this function.
pub fn guest_profile(billing_name: &str, billing_email: &str) -> Result<GuestProfile, DomainError> {
    let (first_name, last_name) = split_name(billing_name);
    let username = format!(
        "{}_{}",
        username_stem(billing_email),
        random_alphanumeric(USERNAME_SUFFIX_LEN).to_lowercase()
    );
    let password_hash = hash_password(&random_alphanumeric(GUEST_PASSWORD_LEN))?;

    Ok(GuestProfile {
        email: normalize_email(billing_email),
        username,
        first_name,
        last_name,
        password_hash,
    })
}

#[cfg(test)]
mod tests {
    use argon2::{PasswordHash, PasswordVerifier};

    use super::*;

    #[test]
    fn guest_profile_derives_names_and_username() {
        let profile = guest_profile("Jane Doe", " Jane.Doe@Example.com ").expect("profile");
        assert_eq!(profile.first_name, "Jane");
        assert_eq!(profile.last_name, "Doe");
        assert_eq!(profile.email, "jane.doe@example.com");
        assert!(profile.username.starts_with("jane_doe_"));
        assert_eq!(profile.username.len(), "jane_doe_".len() + USERNAME_SUFFIX_LEN);
    }

    #[test]
    fn guest_usernames_do_not_collide() {
        let a = guest_profile("A", "same@example.com").unwrap();
        let b = guest_profile("B", "same@example.com").unwrap();
        assert_ne!(a.username, b.username);
        assert_ne!(a.password_hash, b.password_hash);
    }

    #[test]
    fn password_hash_is_argon2() {
        let hash = hash_password("hunter2").unwrap();
        let parsed = PasswordHash::new(&hash).expect("phc string");
        assert!(Argon2::default()
            .verify_password(b"hunter2", &parsed)
            .is_ok());
    }
}
