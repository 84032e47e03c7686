use argon2::{
    password_hash::{self, PasswordHash, PasswordVerifier},
    Argon2,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, error};

lazy_static! {
    static ref BCRYPT_MARKER: Regex = Regex::new(r"^\$2[aby]\$").unwrap();
    static ref ARGON2_MARKER: Regex = Regex::new(r"^\$argon2(id|i|d)\$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashScheme {
    Bcrypt,
    Argon2,
}

/// Shape of the `senha` column for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredPassword<'a> {
    Missing,
    Hashed(HashScheme, &'a str),
    Plain(&'a str),
}

/// Outcome of comparing a supplied password with the stored one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordCheck {
    Match,
    NoMatch,
    VerifierError(String),
}

impl PasswordCheck {
    /// Only an explicit match counts; verifier errors are non-matches.
    pub fn is_match(&self) -> bool {
        matches!(self, PasswordCheck::Match)
    }
}

pub fn hash_scheme(stored: &str) -> Option<HashScheme> {
    if BCRYPT_MARKER.is_match(stored) {
        Some(HashScheme::Bcrypt)
    } else if ARGON2_MARKER.is_match(stored) {
        Some(HashScheme::Argon2)
    } else {
        None
    }
}

pub fn is_hash_format(stored: &str) -> bool {
    hash_scheme(stored).is_some()
}

pub fn classify(stored: Option<&str>) -> StoredPassword<'_> {
    match stored {
        None => StoredPassword::Missing,
        Some(s) => match hash_scheme(s) {
            Some(scheme) => StoredPassword::Hashed(scheme, s),
            None => StoredPassword::Plain(s),
        },
    }
}

/// Compare `plain` against a stored hash. Blocking: run it off the async executor.
pub fn compare_hash(scheme: HashScheme, plain: &str, hash: &str) -> PasswordCheck {
    match scheme {
        HashScheme::Bcrypt => match bcrypt::verify(plain, hash) {
            Ok(true) => PasswordCheck::Match,
            Ok(false) => PasswordCheck::NoMatch,
            Err(e) => PasswordCheck::VerifierError(e.to_string()),
        },
        HashScheme::Argon2 => {
            let parsed = match PasswordHash::new(hash) {
                Ok(p) => p,
                Err(e) => return PasswordCheck::VerifierError(e.to_string()),
            };
            // PHC allows salt and hash to be absent; such a string can never match.
            if parsed.salt.is_none() || parsed.hash.is_none() {
                return PasswordCheck::VerifierError("argon2 hash missing salt or output".into());
            }
            match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
                Ok(()) => PasswordCheck::Match,
                Err(password_hash::Error::Password) => PasswordCheck::NoMatch,
                Err(e) => PasswordCheck::VerifierError(e.to_string()),
            }
        }
    }
}

/// Verify `plain` against whatever is stored for the record.
pub async fn verify(plain: &str, stored: Option<&str>) -> PasswordCheck {
    match classify(stored) {
        StoredPassword::Missing => {
            debug!("no stored password");
            PasswordCheck::NoMatch
        }
        StoredPassword::Plain(s) => {
            let check = if plain == s {
                PasswordCheck::Match
            } else {
                PasswordCheck::NoMatch
            };
            debug!(matched = check.is_match(), "direct compare");
            check
        }
        StoredPassword::Hashed(scheme, hash) => {
            let plain = plain.to_owned();
            let hash = hash.to_owned();
            let check = tokio::task::spawn_blocking(move || compare_hash(scheme, &plain, &hash))
                .await
                .unwrap_or_else(|e| PasswordCheck::VerifierError(e.to_string()));
            match &check {
                PasswordCheck::VerifierError(e) => {
                    error!(error = %e, ?scheme, "hash compare failed; treating as mismatch")
                }
                other => debug!(matched = other.is_match(), ?scheme, "hash compare"),
            }
            check
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::{PasswordHasher, SaltString};

    fn argon2_hash(plain: &str) -> String {
        let salt = SaltString::encode_b64(b"fixed-test-salt!").expect("salt");
        Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .expect("argon2 hash")
            .to_string()
    }

    #[test]
    fn recognises_bcrypt_markers() {
        for s in ["$2a$10$abc", "$2b$12$abc", "$2y$04$abc"] {
            assert_eq!(hash_scheme(s), Some(HashScheme::Bcrypt), "{s}");
        }
        assert!(!is_hash_format("$2x$10$abc"));
        assert!(!is_hash_format("2b$10$abc"));
    }

    #[test]
    fn recognises_argon2_markers() {
        assert_eq!(hash_scheme("$argon2id$v=19$m=19456"), Some(HashScheme::Argon2));
        assert_eq!(hash_scheme("$argon2i$v=19$"), Some(HashScheme::Argon2));
        assert!(!is_hash_format("$argon3$"));
    }

    #[test]
    fn classify_distinguishes_missing_plain_and_hashed() {
        assert_eq!(classify(None), StoredPassword::Missing);
        assert_eq!(classify(Some("hunter2")), StoredPassword::Plain("hunter2"));
        assert_eq!(
            classify(Some("$2b$04$x")),
            StoredPassword::Hashed(HashScheme::Bcrypt, "$2b$04$x")
        );
    }

    #[tokio::test]
    async fn bcrypt_hash_verifies() {
        let hash = bcrypt::hash("secret", 4).expect("bcrypt hash");
        assert_eq!(verify("secret", Some(&hash)).await, PasswordCheck::Match);
        assert_eq!(verify("wrong", Some(&hash)).await, PasswordCheck::NoMatch);
    }

    #[tokio::test]
    async fn argon2_hash_verifies() {
        let hash = argon2_hash("Secur3P@ssw0rd!");
        assert!(verify("Secur3P@ssw0rd!", Some(&hash)).await.is_match());
        assert_eq!(verify("nope", Some(&hash)).await, PasswordCheck::NoMatch);
    }

    #[tokio::test]
    async fn corrupt_hash_is_a_verifier_error_not_a_match() {
        let check = verify("secret", Some("$2b$10$tooshort")).await;
        assert!(matches!(check, PasswordCheck::VerifierError(_)));
        assert!(!check.is_match());

        let check = verify("secret", Some("$argon2id$garbage")).await;
        assert!(matches!(check, PasswordCheck::VerifierError(_)));

        // salt present, output missing
        let check = verify("secret", Some("$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ")).await;
        assert!(matches!(check, PasswordCheck::VerifierError(_)));
    }

    #[tokio::test]
    async fn plaintext_requires_exact_equality() {
        assert!(verify("legacy", Some("legacy")).await.is_match());
        assert!(!verify("Legacy", Some("legacy")).await.is_match());
        assert!(!verify("legacy ", Some("legacy")).await.is_match());
    }

    #[tokio::test]
    async fn missing_password_never_matches() {
        assert_eq!(verify("", None).await, PasswordCheck::NoMatch);
    }
}
