//! CLI command implementations

pub mod add;
pub mod list;
pub mod login;
pub mod register;

use std::path::PathBuf;

use anyhow::{Context, Result};
use dialoguer::{Input, Password};
use moneytracker_core::config::Config;
use moneytracker_core::{Credentials, Error, ErrorKind, IdentityClaim, MoneyTrackerContext};
use serde::Serialize;
use tracing::debug;

/// Get the data directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("MONEYTRACKER_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".moneytracker"))
}

/// Map a command failure onto the message and class shown to the user
///
/// Core errors only ever expose their public message. Anything else is a
/// bootstrap failure and is reported in full.
pub fn describe_error(err: &anyhow::Error) -> (String, ErrorKind) {
    match err.downcast_ref::<Error>() {
        Some(core) => (core.public_message(), core.kind()),
        None => (format!("{:#}", err), ErrorKind::ServerError),
    }
}

/// Per-invocation state shared by every command
pub struct Session {
    data_dir: PathBuf,
    config: Config,
    username: Option<String>,
    password: Option<String>,
    pub json: bool,
}

impl Session {
    pub fn new(
        data_dir: PathBuf,
        config: Config,
        username: Option<String>,
        password: Option<String>,
        json: bool,
    ) -> Self {
        Self {
            data_dir,
            config,
            username,
            password,
            json,
        }
    }

    /// Open the database and wire the services
    pub fn context(&self) -> Result<MoneyTrackerContext> {
        debug!(data_dir = %self.data_dir.display(), "opening context");
        MoneyTrackerContext::with_config(&self.data_dir, self.config.clone())
            .context("Failed to initialize moneytracker context")
    }

    /// Collect credentials from flags, environment or an interactive prompt
    pub fn credentials(&self) -> Result<Credentials> {
        let interactive = atty::is(atty::Stream::Stdin) && !self.json;

        let username = match (&self.username, interactive) {
            (Some(name), _) => name.clone(),
            (None, true) => Input::new().with_prompt("Username").interact_text()?,
            (None, false) => return Err(Error::invalid_input("username is required").into()),
        };

        let password = match (&self.password, interactive) {
            (Some(secret), _) => secret.clone(),
            (None, true) => Password::new().with_prompt("Password").interact()?,
            (None, false) => return Err(Error::invalid_input("password is required").into()),
        };

        Ok(Credentials::new(username, password))
    }

    /// Credentials wrapped as a claim for the ownership gate
    pub fn claim(&self) -> Result<IdentityClaim> {
        Ok(IdentityClaim::from(self.credentials()?))
    }

    /// Print a success payload as JSON, or run the text renderer
    pub fn render<T: Serialize>(&self, data: T, text: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            let result = moneytracker_core::OperationResult::ok(data);
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            text(&data);
        }
        Ok(())
    }
}
