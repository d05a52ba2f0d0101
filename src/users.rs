use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::{NewUser, ProfileUpdate, Taken, User};
use crate::password::{hash_password, verify_password, MIN_PASSWORD_LEN};
use crate::store::UserStore;

#[derive(Deserialize, Debug, Default)]
pub struct Registration {
    #[serde(alias = "nome")]
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "senha")]
    pub password: Option<String>,
    #[serde(alias = "dataNascimento", alias = "birthDate")]
    pub birth_date: Option<String>,
    #[serde(alias = "controle", alias = "controlId")]
    pub control_id: Option<i64>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Credentials {
    pub email: Option<String>,
    #[serde(alias = "senha")]
    pub password: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct PasswordReset {
    pub email: Option<String>,
    #[serde(alias = "dataNascimento", alias = "birthDate")]
    pub birth_date: Option<String>,
    #[serde(alias = "senha")]
    pub password: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ProfileForm {
    #[serde(alias = "nome")]
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "dataNascimento", alias = "birthDate")]
    pub birth_date: Option<String>,
    #[serde(alias = "controle", alias = "controlId")]
    pub control_id: Option<i64>,
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::validation(format!("{field} is required"))),
    }
}

/// Trimmed, lowercased email. Only checks for a `local@domain.tld` shape.
fn normalize_email(value: Option<String>) -> Result<String, AppError> {
    let email = required(value, "email")?.to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(AppError::validation("invalid email"));
    }
    Ok(email)
}

fn parse_birth_date(value: Option<String>) -> Result<NaiveDate, AppError> {
    let raw = required(value, "birthDate")?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|_| AppError::validation("birthDate must be a YYYY-MM-DD date"))
}

fn check_password(value: Option<String>) -> Result<String, AppError> {
    let password = value.unwrap_or_default();
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(password)
}

fn conflict(taken: Taken) -> AppError {
    match taken {
        Taken::Name => AppError::Conflict("name already in use".to_string()),
        Taken::Email => AppError::Conflict("email already in use".to_string()),
    }
}

pub async fn register(store: &dyn UserStore, form: Registration) -> Result<User, AppError> {
    let name = required(form.name, "name")?;
    let email = normalize_email(form.email)?;
    let password = check_password(form.password)?;
    let birth_date = parse_birth_date(form.birth_date)?;
    let control_id = form
        .control_id
        .ok_or_else(|| AppError::validation("controlId is required"))?;

    if let Some(taken) = store.find_taken(&name, &email, None).await? {
        return Err(conflict(taken));
    }

    let user = store
        .create_user(&NewUser {
            name,
            email,
            password_hash: hash_password(password).await?,
            birth_date,
            control_id,
        })
        .await?;
    tracing::info!(user_id = user.id, "user registered");
    Ok(user)
}

pub async fn login(store: &dyn UserStore, credentials: Credentials) -> Result<User, AppError> {
    let (Some(email), Some(password)) = (credentials.email, credentials.password) else {
        return Err(AppError::validation("email and password are required"));
    };
    let email = email.trim().to_lowercase();

    let Some(user) = store.find_user_by_email(&email).await? else {
        return Err(AppError::validation("email not registered"));
    };
    if !verify_password(user.password_hash.clone(), password).await? {
        tracing::info!(user_id = user.id, "rejected login");
        return Err(AppError::InvalidCredentials);
    }
    Ok(user)
}

/// Sets a new password once the stored birth date matches the one supplied.
pub async fn reset_password(store: &dyn UserStore, form: PasswordReset) -> Result<(), AppError> {
    if form.email.is_none() || form.birth_date.is_none() || form.password.is_none() {
        return Err(AppError::validation(
            "email, birthDate and password are required",
        ));
    }
    let email = required(form.email, "email")?.to_lowercase();
    let birth_date = parse_birth_date(form.birth_date)?;
    let password = check_password(form.password)?;

    let Some(user) = store.find_user_by_email(&email).await? else {
        return Err(AppError::NotFound("user not found".to_string()));
    };
    if user.birth_date != birth_date {
        return Err(AppError::validation("birth date does not match"));
    }

    store
        .update_password(user.id, &hash_password(password).await?)
        .await?;
    tracing::info!(user_id = user.id, "password reset");
    Ok(())
}

pub async fn get_user(store: &dyn UserStore, id: i64) -> Result<User, AppError> {
    store
        .find_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))
}

pub async fn update_profile(
    store: &dyn UserStore,
    id: i64,
    form: ProfileForm,
) -> Result<User, AppError> {
    let name = required(form.name, "name")?;
    let email = normalize_email(form.email)?;
    let birth_date = parse_birth_date(form.birth_date)?;
    let control_id = form
        .control_id
        .ok_or_else(|| AppError::validation("controlId is required"))?;

    if let Some(taken) = store.find_taken(&name, &email, Some(id)).await? {
        return Err(conflict(taken));
    }

    let update = ProfileUpdate {
        name,
        email,
        birth_date,
        control_id,
    };
    store
        .update_profile(id, &update)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))
}

/// Deletes the user and, with them, every score they submitted.
pub async fn delete_user(store: &dyn UserStore, id: i64) -> Result<(), AppError> {
    if !store.delete_user(id).await? {
        return Err(AppError::NotFound("user not found".to_string()));
    }
    tracing::info!(user_id = id, "user deleted");
    Ok(())
}
