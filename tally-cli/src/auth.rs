use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use tally_api::{ApiClient, AuthResponse};

use crate::state::ensure_tally_home;

/// What signup/login leave behind for later commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub logged_in_at_utc: Option<String>,
}

impl Session {
    fn from_response(resp: AuthResponse) -> Self {
        Self {
            token: resp.token,
            username: resp.username,
            logged_in_at_utc: Some(chrono::Utc::now().to_rfc3339()),
        }
    }
}

fn session_path() -> Result<PathBuf> {
    Ok(ensure_tally_home()?.join("session.json"))
}

pub fn load_session() -> Result<Option<Session>> {
    load_session_from(&session_path()?)
}

pub fn load_session_from(p: &Path) -> Result<Option<Session>> {
    if !p.exists() {
        return Ok(None);
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    let session = serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))?;
    Ok(Some(session))
}

pub fn save_session_to(p: &Path, session: &Session) -> Result<()> {
    let s = serde_json::to_string_pretty(session)?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

/// The stored session, or an error telling the user how to get one
pub fn require_session() -> Result<Session> {
    match load_session()? {
        Some(session) => Ok(session),
        None => bail!("not logged in; run: tally login --email <email>"),
    }
}

fn prompt_password(label: &str) -> Result<String> {
    let password = rpassword::prompt_password(format!("{label}: ")).context("read password")?;
    if password.is_empty() {
        bail!("password cannot be empty");
    }
    Ok(password)
}

pub async fn signup(client: &ApiClient, username: &str, email: &str) -> Result<()> {
    let password = prompt_password("Password")?;
    let confirm = prompt_password("Confirm password")?;
    if password != confirm {
        bail!("passwords do not match");
    }

    let resp = client
        .signup(username, email, &password)
        .await
        .context("signup failed")?;
    let session = Session::from_response(resp);
    save_session_to(&session_path()?, &session)?;
    tracing::info!(username = %session.username, "signed up");
    println!("Signed up as {}", session.username);
    Ok(())
}

pub async fn login(client: &ApiClient, email: &str) -> Result<()> {
    let password = prompt_password("Password")?;
    let resp = client
        .login(email, &password)
        .await
        .context("login failed")?;
    let session = Session::from_response(resp);
    save_session_to(&session_path()?, &session)?;
    tracing::info!(username = %session.username, "logged in");
    println!("Hello, {}!", session.username);
    Ok(())
}

pub fn logout() -> Result<()> {
    let p = session_path()?;
    if p.exists() {
        fs::remove_file(&p).with_context(|| format!("remove {}", p.display()))?;
        println!("Logged out");
    } else {
        println!("Not logged in");
    }
    Ok(())
}

pub fn whoami() -> Result<()> {
    match load_session()? {
        Some(s) => println!(
            "{} (since {})",
            s.username,
            s.logged_in_at_utc.as_deref().unwrap_or("unknown")
        ),
        None => println!("Not logged in"),
    }
    Ok(())
}
