#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use config::{ConfigFairing, DatabaseFairing};
use identity::ClientIdentityFairing;
use logging::LoggerFairing;

pub mod api;
mod config;
pub mod error;
mod identity;
mod logging;
pub mod model;

pub use config::Config;

/// Assemble the server: routes, configuration, database, and per-request fairings.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(DatabaseFairing)
        .attach(ClientIdentityFairing)
}
