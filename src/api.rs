use rocket::Route;

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod survey;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(catalog::routes());
    routes.extend(survey::routes());
    routes.extend(auth::routes());
    routes.extend(admin::routes());
    routes
}
