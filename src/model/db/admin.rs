use std::ops::Deref;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{
    api::credentials::Credentials,
    mongodb::{Coll, Id},
};

use super::account::AccountCore;

/// An admin user from the database, with its unique ID.
#[derive(Debug, Serialize, Deserialize)]
pub struct Admin {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub account: AccountCore,
}

impl Admin {
    /// A new admin with a freshly generated ID.
    pub fn new(account: AccountCore) -> Self {
        Self {
            id: Id::new(),
            account,
        }
    }
}

impl Deref for Admin {
    type Target = AccountCore;

    fn deref(&self) -> &Self::Target {
        &self.account
    }
}

/// Ensure at least one admin exists, creating one with the given credentials if not.
pub async fn ensure_admin_exists(admins: &Coll<Admin>, bootstrap: Credentials) -> Result<()> {
    if admins.count_documents(None, None).await? == 0 {
        info!("No admins found, creating admin '{}'", bootstrap.username);
        let admin = Admin::new(bootstrap.try_into()?);
        admins.insert_one(admin, None).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use mongodb::bson::doc;

    use super::*;

    #[backend_test]
    async fn bootstrap_is_idempotent(admins: Coll<Admin>) {
        // The database fairing has already bootstrapped one admin.
        assert_eq!(admins.count_documents(None, None).await.unwrap(), 1);

        ensure_admin_exists(&admins, Credentials::admin_example())
            .await
            .unwrap();
        assert_eq!(admins.count_documents(None, None).await.unwrap(), 1);
        assert!(admins
            .find_one(doc! { "username": Credentials::admin_example().username }, None)
            .await
            .unwrap()
            .is_none());
    }

    #[backend_test]
    async fn bootstrap_into_empty(admins: Coll<Admin>) {
        admins.delete_many(doc! {}, None).await.unwrap();

        ensure_admin_exists(&admins, Credentials::admin_example())
            .await
            .unwrap();
        let admin = admins
            .find_one(doc! { "username": Credentials::admin_example().username }, None)
            .await
            .unwrap()
            .unwrap();
        assert!(admin.verify_password(Credentials::admin_example().password));
        assert!(!admin.verify_password("not the password"));
    }
}
