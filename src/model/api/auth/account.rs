use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::model::{
    db::{admin::Admin, user::User},
    mongodb::Id,
};

/// An account holder of our application, having defined rights.
pub trait Account {
    /// The rights of this account type.
    const RIGHTS: Rights;
    /// Get the account's ID.
    fn id(&self) -> Id;
}

/// Different privilege levels.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum Rights {
    Respondent = 0,
    Admin = 1,
}

impl Account for User {
    const RIGHTS: Rights = Rights::Respondent;

    fn id(&self) -> Id {
        self.id
    }
}

impl Account for Admin {
    const RIGHTS: Rights = Rights::Admin;

    fn id(&self) -> Id {
        self.id
    }
}
