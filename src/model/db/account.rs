use serde::{Deserialize, Serialize};

/// Login data shared by admins and users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCore {
    pub username: String,
    pub password_hash: String,
}

impl AccountCore {
    /// Check whether the given password is correct.
    pub fn verify_password<T: AsRef<[u8]>>(&self, password: T) -> bool {
        // A malformed hash can only come from outside this crate; treat it as a mismatch.
        argon2::verify_encoded(&self.password_hash, password.as_ref()).unwrap_or(false)
    }
}
