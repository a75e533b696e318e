use std::fmt::{Display, Formatter};
use std::str::FromStr;

use data_encoding::HEXLOWER;
use rocket::http::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

/// The cookie carrying an anonymous visitor's identity.
pub const CLIENT_ID_COOKIE: &str = "hashcode_id";

/// Number of random bytes in a client ID; rendered as twice as many hex characters.
const CLIENT_ID_BYTES: usize = 16;

/// A random per-browser identity for anonymous visitors.
///
/// Always 32 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientId(String);

impl ClientId {
    /// Generate a fresh random identity.
    pub fn generate() -> Self {
        let bytes: [u8; CLIENT_ID_BYTES] = rand::random();
        Self(HEXLOWER.encode(&bytes))
    }

    /// Read a well-formed identity from the request cookies, if there is one.
    pub fn from_cookies(cookies: &CookieJar<'_>) -> Option<Self> {
        cookies.get(CLIENT_ID_COOKIE)?.value().parse().ok()
    }

    /// A site-wide session cookie carrying this identity.
    pub fn into_cookie(self) -> Cookie<'static> {
        Cookie::build(CLIENT_ID_COOKIE, self.0)
            .path("/")
            .same_site(SameSite::Lax)
            .finish()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The client ID was not 32 hex characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedClientId;

impl Display for MalformedClientId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "client ID must be {} hex characters", CLIENT_ID_BYTES * 2)
    }
}

impl FromStr for ClientId {
    type Err = MalformedClientId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != CLIENT_ID_BYTES * 2 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(MalformedClientId);
        }
        Ok(Self(s.to_ascii_lowercase()))
    }
}

impl TryFrom<String> for ClientId {
    type Error = MalformedClientId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClientId> for String {
    fn from(id: ClientId) -> Self {
        id.0
    }
}

impl Display for ClientId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
