use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

use super::account::AccountCore;

/// A respondent account from the database, with its unique ID.
#[derive(Debug, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub account: AccountCore,
}

impl User {
    /// A new user with a freshly generated ID.
    pub fn new(account: AccountCore) -> Self {
        Self {
            id: Id::new(),
            account,
        }
    }
}

impl Deref for User {
    type Target = AccountCore;

    fn deref(&self) -> &Self::Target {
        &self.account
    }
}
