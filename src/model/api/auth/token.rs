use std::marker::PhantomData;

use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use mongodb::{error::Error as DbError, Database};
use rocket::{
    http::{Cookie, CookieJar, SameSite, Status},
    outcome::{try_outcome, IntoOutcome},
    request::{FromRequest, Outcome},
    time::Duration,
    Request, State,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::config::Config;
use crate::error::Error;
use crate::model::mongodb::{Coll, Id, MongoCollection};

use super::account::{Account, Rights};

pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// An authentication token representing a specific account with specific rights.
#[derive(Serialize, Deserialize)]
pub struct AuthToken<U> {
    pub id: Id,
    #[serde(rename = "rgt")]
    pub rights: Rights,
    #[serde(skip)]
    phantom: PhantomData<U>,
}

impl<U> AuthToken<U> {
    /// Does this token permit the given rights?
    pub fn permits(&self, target: Rights) -> bool {
        self.rights == target
    }
}

impl<U> AuthToken<U>
where
    U: Account,
{
    /// Create a new [`AuthToken`] for the given account, with the correct rights for its type.
    pub fn new(account: &U) -> Self {
        Self {
            id: account.id(),
            rights: U::RIGHTS,
            phantom: PhantomData,
        }
    }

    /// Serialize this token into a cookie.
    pub fn into_cookie(self, config: &Config) -> Cookie<'static> {
        let claims = Claims {
            token: self,
            expire_at: Utc::now() + config.auth_ttl(),
        };

        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )
        .expect("JWT encoding is infallible with default settings");

        Cookie::build(AUTH_TOKEN_COOKIE, token)
            .path("/")
            .max_age(Duration::seconds(config.auth_ttl().num_seconds()))
            .http_only(true)
            .same_site(SameSite::Strict)
            .finish()
    }

    /// Deserialize a token from a cookie.
    pub fn from_cookie(cookie: &Cookie<'_>, config: &Config) -> Result<Self, Error> {
        let token = jsonwebtoken::decode(
            cookie.value(),
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|claims: TokenData<Claims<U>>| claims.claims.token)?;
        Ok(token)
    }

    /// Decode the token in the jar, if there is one and it carries this account type's rights.
    /// Does not check that the account still exists.
    pub fn from_jar(cookies: &CookieJar<'_>, config: &Config) -> Option<Self> {
        let token = Self::from_cookie(cookies.get(AUTH_TOKEN_COOKIE)?, config).ok()?;
        token.permits(U::RIGHTS).then_some(token)
    }
}

impl<U> AuthToken<U>
where
    U: MongoCollection + DeserializeOwned + Unpin + Send + Sync,
{
    /// Does the account this token was issued to still exist?
    pub async fn account_exists(&self, db: &Database) -> Result<bool, DbError> {
        let account = Coll::<U>::from_db(db)
            .find_one(self.id.as_doc(), None)
            .await?;
        Ok(account.is_some())
    }
}

/// Cookie claims: the token itself plus an expiry datetime.
#[derive(Serialize, Deserialize)]
struct Claims<U> {
    #[serde(flatten, bound = "")]
    token: AuthToken<U>,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

#[rocket::async_trait]
impl<'r, U> FromRequest<'r> for AuthToken<U>
where
    U: Account + MongoCollection + DeserializeOwned + Unpin + Send + Sync,
{
    type Error = Error;

    /// Get an [`AuthToken`] from the cookie and verify that it has the correct rights for this
    /// account type, and that the account still exists.
    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        // Unwrap is safe as `Config` is always managed.
        let config = req.guard::<&State<Config>>().await.unwrap();

        // Forward to any routes that do not require an authentication token.
        let token: Self = try_outcome!(Self::from_jar(req.cookies(), config).or_forward(()));

        let db = req.guard::<&State<Database>>().await.unwrap();
        match token.account_exists(db).await {
            Ok(true) => Outcome::Success(token),
            Ok(false) => Outcome::Forward(()),
            Err(e) => Outcome::Failure((Status::InternalServerError, e.into())),
        }
    }
}
