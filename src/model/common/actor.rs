use std::fmt::{Display, Formatter};

use mongodb::bson::{to_bson, Bson};
use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    Request,
};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::{
    api::auth::AuthToken,
    db::{admin::Admin, user::User},
    mongodb::Id,
};

use super::ClientId;

/// The identity an answer is recorded under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    /// A logged-in user.
    User(Id),
    /// A logged-in admin.
    Admin(Id),
    /// An anonymous visitor, identified by their client cookie.
    Anonymous(ClientId),
}

impl Actor {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous(_))
    }
}

impl Display for Actor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User(id) => write!(f, "user {id}"),
            Self::Admin(id) => write!(f, "admin {id}"),
            Self::Anonymous(client_id) => write!(f, "anonymous {client_id}"),
        }
    }
}

impl From<Actor> for Bson {
    fn from(actor: Actor) -> Self {
        to_bson(&actor).expect("Serialisation is infallible")
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Actor {
    type Error = Error;

    /// An account token takes precedence; otherwise the visitor must carry a client cookie.
    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match req.guard::<AuthToken<User>>().await {
            Outcome::Success(token) => return Outcome::Success(Actor::User(token.id)),
            Outcome::Failure(failure) => return Outcome::Failure(failure),
            Outcome::Forward(()) => {}
        }
        match req.guard::<AuthToken<Admin>>().await {
            Outcome::Success(token) => return Outcome::Success(Actor::Admin(token.id)),
            Outcome::Failure(failure) => return Outcome::Failure(failure),
            Outcome::Forward(()) => {}
        }

        match ClientId::from_cookies(req.cookies()) {
            Some(client_id) => Outcome::Success(Actor::Anonymous(client_id)),
            None => Outcome::Failure((
                Status::NotAcceptable,
                Error::not_acceptable("Anonymous visitor has no client ID cookie".to_string()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use mongodb::bson::doc;

    use super::*;

    #[test]
    fn stored_as_single_key_documents() {
        let id = Id::new();
        assert_eq!(Bson::from(Actor::User(id)), Bson::Document(doc! { "user": *id }));

        let client_id = ClientId::generate();
        assert_eq!(
            Bson::from(Actor::Anonymous(client_id.clone())),
            Bson::Document(doc! { "anonymous": client_id.as_str() })
        );
        assert!(Actor::Anonymous(client_id).is_anonymous());
        assert!(!Actor::User(id).is_anonymous());

        assert_eq!(Bson::from(Actor::Admin(id)), Bson::Document(doc! { "admin": *id }));
        assert!(!Actor::Admin(id).is_anonymous());
    }
}
