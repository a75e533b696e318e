mod account;
mod token;

pub use account::{Account, Rights};
pub use token::{AuthToken, AUTH_TOKEN_COOKIE};
