use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest},
        jwt::JwtKeys,
        password::{hash_password, is_long_enough, verify_password},
        repo::UserStore,
        repo_types::NewUser,
    },
    error::{AppError, StoreError},
};

const INVALID_CREDENTIALS: &str = "Invalid username or password";
const MISSING_CREDENTIALS: &str = "Username and password are required";
const USERNAME_TAKEN: &str = "Username already exists";

#[derive(Debug, Clone)]
pub struct RegisteredUser {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone)]
pub struct LoginSession {
    pub token: String,
    pub expires_in_minutes: i64,
    pub user_id: Uuid,
    pub username: String,
}

pub async fn register(
    users: &dyn UserStore,
    req: RegisterRequest,
) -> Result<RegisteredUser, AppError> {
    let username = req.username.trim().to_string();
    if username.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(MISSING_CREDENTIALS.into()));
    }
    if !is_long_enough(&req.password) {
        warn!(%username, "password too short");
        return Err(AppError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }

    if users.exists(&username).await.map_err(store_failure)? {
        warn!(%username, "username already registered");
        return Err(AppError::Conflict(USERNAME_TAKEN.into()));
    }

    let password_hash = hash_password(&req.password)?;
    let email = req
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());

    let user = users
        .create(NewUser {
            username,
            email,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            StoreError::UsernameTaken => AppError::Conflict(USERNAME_TAKEN.into()),
            other => store_failure(other),
        })?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(RegisteredUser {
        id: user.id,
        username: user.username,
    })
}

pub async fn login(
    users: &dyn UserStore,
    keys: &JwtKeys,
    req: LoginRequest,
) -> Result<LoginSession, AppError> {
    let username = req.username.trim();
    if username.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(MISSING_CREDENTIALS.into()));
    }

    let Some(user) = users
        .find_by_username(username)
        .await
        .map_err(store_failure)?
    else {
        warn!(%username, "login unknown username");
        return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
    };

    let ok = verify_password(&req.password, &user.password_hash).unwrap_or_else(|e| {
        error!(error = %e, user_id = %user.id, "stored password hash unreadable");
        false
    });
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
    }

    let token = keys.sign(user.id, &user.username)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(LoginSession {
        token,
        expires_in_minutes: keys.ttl_minutes(),
        user_id: user.id,
        username: user.username,
    })
}

fn store_failure(e: StoreError) -> AppError {
    AppError::Unexpected(anyhow::Error::new(e).context("user store"))
}
