use argon2::Config;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::db::account::AccountCore;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Raw account credentials, received from an admin or user. These are never
/// stored directly, since the password is in plaintext.
#[derive(Clone, Deserialize, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl TryFrom<Credentials> for AccountCore {
    type Error = Error;

    /// Convert [`Credentials`] to an account by hashing the password.
    /// This enforces that the username is non-empty, and the password meets minimum length.
    fn try_from(cred: Credentials) -> Result<Self, Self::Error> {
        if cred.username.is_empty() || cred.password.len() < MIN_PASSWORD_LENGTH {
            return Err(Error::bad_request(format!(
                "Username must be non-empty and password at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        // 16 bytes is recommended for password hashing:
        //  https://en.wikipedia.org/wiki/Argon2
        let mut salt = [0_u8; 16];
        rand::thread_rng().fill(&mut salt);
        let password_hash =
            argon2::hash_encoded(cred.password.as_bytes(), &salt, &Config::default())?;
        Ok(Self {
            username: cred.username,
            password_hash,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashing() {
        let account: AccountCore = Credentials::user_example().try_into().unwrap();
        assert_eq!(account.username, Credentials::user_example().username);
        assert_ne!(account.password_hash, Credentials::user_example().password);
        assert!(account.verify_password(Credentials::user_example().password));
        assert!(!account.verify_password(Credentials::user_example2().password));
    }

    #[test]
    fn rejects_weak_credentials() {
        assert!(AccountCore::try_from(Credentials::empty()).is_err());
        let short = Credentials {
            username: "bob".into(),
            password: "short".into(),
        };
        assert!(AccountCore::try_from(short).is_err());
    }
}
