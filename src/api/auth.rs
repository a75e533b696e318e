use log::info;
use mongodb::bson::doc;
use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::{
    error::{Error, Result},
    model::{
        api::{
            auth::{AuthToken, AUTH_TOKEN_COOKIE},
            credentials::Credentials,
        },
        db::{account::AccountCore, admin::Admin, user::User},
        mongodb::{is_conflict, Coll},
    },
    Config,
};

pub fn routes() -> Vec<Route> {
    routes![authenticate_admin, register_user, authenticate_user, logout]
}

fn bad_login(kind: &str) -> Error {
    Error::Status(
        Status::Unauthorized,
        format!("No {kind} found with the provided username and password combination."),
    )
}

#[post("/auth/admin", data = "<credentials>", format = "json")]
pub async fn authenticate_admin(
    cookies: &CookieJar<'_>,
    credentials: Json<Credentials>,
    admins: Coll<Admin>,
    config: &State<Config>,
) -> Result<()> {
    let with_username = doc! {
        "username": &credentials.username
    };

    let admin = admins
        .find_one(with_username, None)
        .await?
        .filter(|admin| admin.verify_password(&credentials.password))
        .ok_or_else(|| bad_login("admin"))?;

    cookies.add(AuthToken::new(&admin).into_cookie(config));
    Ok(())
}

#[post("/auth/user/register", data = "<credentials>", format = "json")]
pub async fn register_user(
    cookies: &CookieJar<'_>,
    credentials: Json<Credentials>,
    users: Coll<User>,
    config: &State<Config>,
) -> Result<()> {
    let credentials = credentials.into_inner();
    let username = credentials.username.clone();
    let taken = || Error::bad_request(format!("Username already in use: {username}"));

    let with_username = doc! {
        "username": &username
    };
    if users.find_one(with_username, None).await?.is_some() {
        return Err(taken());
    }

    let account: AccountCore = credentials.try_into()?;
    let user = User::new(account);
    match users.insert_one(&user, None).await {
        Ok(_) => {}
        // Lost a race with another registration of the same name.
        Err(e) if is_conflict(&e) => return Err(taken()),
        Err(e) => return Err(e.into()),
    }
    info!("Registered user '{}'", user.username);

    cookies.add(AuthToken::new(&user).into_cookie(config));
    Ok(())
}

#[post("/auth/user", data = "<credentials>", format = "json")]
pub async fn authenticate_user(
    cookies: &CookieJar<'_>,
    credentials: Json<Credentials>,
    users: Coll<User>,
    config: &State<Config>,
) -> Result<()> {
    let with_username = doc! {
        "username": &credentials.username
    };

    let user = users
        .find_one(with_username, None)
        .await?
        .filter(|user| user.verify_password(&credentials.password))
        .ok_or_else(|| bad_login("user"))?;

    cookies.add(AuthToken::new(&user).into_cookie(config));
    Ok(())
}

#[delete("/auth")]
pub fn logout(cookies: &CookieJar) -> Status {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Status::Ok
}

#[cfg(test)]
mod tests {
    use rocket::{http::ContentType, local::asynchronous::Client, serde::json::serde_json::json};

    use super::*;

    #[backend_test]
    async fn admin_authenticate_valid(client: Client, admins: Coll<Admin>) {
        // Ensure there is an admin to login as
        let admin = Admin::new(Credentials::admin_example().try_into().unwrap());
        admins.insert_one(admin, None).await.unwrap();

        let response = client
            .post(uri!(authenticate_admin))
            .header(ContentType::JSON)
            .body(json!(Credentials::admin_example()).to_string())
            .dispatch()
            .await;

        assert_eq!(Status::Ok, response.status());
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());
    }

    #[backend_test]
    async fn admin_authenticate_invalid(client: Client, admins: Coll<Admin>) {
        let admin = Admin::new(Credentials::admin_example().try_into().unwrap());
        admins.insert_one(admin, None).await.unwrap();

        // Unknown username
        let response = client
            .post(uri!(authenticate_admin))
            .header(ContentType::JSON)
            .body(json!(Credentials::empty()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Unauthorized, response.status());
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));

        // Wrong password
        let response = client
            .post(uri!(authenticate_admin))
            .header(ContentType::JSON)
            .body(
                json!({
                    "username": Credentials::admin_example().username,
                    "password": "",
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(Status::Unauthorized, response.status());
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));

        // A user cannot log in as an admin.
        let response = client
            .post(uri!(register_user))
            .header(ContentType::JSON)
            .body(json!(Credentials::user_example()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        client.delete(uri!(logout)).dispatch().await;
        let response = client
            .post(uri!(authenticate_admin))
            .header(ContentType::JSON)
            .body(json!(Credentials::user_example()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Unauthorized, response.status());
    }

    #[backend_test]
    async fn register_then_login(client: Client, users: Coll<User>) {
        let response = client
            .post(uri!(register_user))
            .header(ContentType::JSON)
            .body(json!(Credentials::user_example()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());

        let user = users
            .find_one(doc! { "username": Credentials::user_example().username }, None)
            .await
            .unwrap()
            .unwrap();
        assert!(user.verify_password(Credentials::user_example().password));

        client.delete(uri!(logout)).dispatch().await;
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_none());

        let response = client
            .post(uri!(authenticate_user))
            .header(ContentType::JSON)
            .body(json!(Credentials::user_example()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());
    }

    #[backend_test]
    async fn bad_registrations(client: Client, users: Coll<User>) {
        // Username taken.
        for expected in [Status::Ok, Status::BadRequest] {
            let response = client
                .post(uri!(register_user))
                .header(ContentType::JSON)
                .body(json!(Credentials::user_example()).to_string())
                .dispatch()
                .await;
            assert_eq!(expected, response.status());
        }

        // Password too short.
        let response = client
            .post(uri!(register_user))
            .header(ContentType::JSON)
            .body(json!({"username": "bob", "password": "short"}).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());

        // Empty username.
        let response = client
            .post(uri!(register_user))
            .header(ContentType::JSON)
            .body(json!(Credentials::empty()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());

        assert_eq!(users.count_documents(None, None).await.unwrap(), 1);
    }

    #[backend_test(user)]
    async fn logout_user(client: Client) {
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());
        let response = client.delete(uri!(logout)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_none());
    }

    #[backend_test]
    async fn logout_not_logged_in(client: Client) {
        let response = client.delete(uri!(logout)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_none());
    }
}
