use log::{debug, warn};
use mongodb::Database;
use rocket::{
    fairing::{Fairing, Info, Kind},
    http::Cookie,
    Request, Response,
};
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::model::{
    api::auth::{Account, AuthToken, AUTH_TOKEN_COOKIE},
    common::{ClientId, CLIENT_ID_COOKIE},
    db::{admin::Admin, user::User},
    mongodb::MongoCollection,
};

/// Hands every visitor who is neither logged in nor already identified a
/// fresh anonymous [`ClientId`] cookie.
#[derive(Debug, Copy, Clone)]
pub struct ClientIdentityFairing;

impl ClientIdentityFairing {
    /// Is this request from a known visitor, counting cookies set by the handler?
    async fn is_identified(req: &Request<'_>) -> bool {
        let cookies = req.cookies();
        let has_client_id = cookies
            .get_pending(CLIENT_ID_COOKIE)
            .and_then(|cookie| cookie.value().parse::<ClientId>().ok())
            .is_some();
        if has_client_id {
            return true;
        }

        let rocket = req.rocket();
        match (
            cookies.get_pending(AUTH_TOKEN_COOKIE),
            rocket.state::<Config>(),
            rocket.state::<Database>(),
        ) {
            (Some(cookie), Some(config), Some(db)) => {
                Self::is_logged_in::<User>(&cookie, config, db).await
                    || Self::is_logged_in::<Admin>(&cookie, config, db).await
            }
            _ => false,
        }
    }

    /// Does the cookie hold a valid token for an existing account of this type?
    async fn is_logged_in<U>(cookie: &Cookie<'_>, config: &Config, db: &Database) -> bool
    where
        U: Account + MongoCollection + DeserializeOwned + Unpin + Send + Sync,
    {
        let token = match AuthToken::<U>::from_cookie(cookie, config) {
            Ok(token) if token.permits(U::RIGHTS) => token,
            _ => return false,
        };
        match token.account_exists(db).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!("Failed to look up {} account {}: {e}", U::NAME, token.id);
                false
            }
        }
    }
}

#[rocket::async_trait]
impl Fairing for ClientIdentityFairing {
    fn info(&self) -> Info {
        Info {
            name: "Client identity",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        if Self::is_identified(req).await {
            return;
        }
        let client_id = ClientId::generate();
        debug!("Issuing client ID {client_id}");
        res.adjoin_header(client_id.into_cookie());
    }
}
