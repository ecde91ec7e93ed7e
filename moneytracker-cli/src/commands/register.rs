//! Register command - create a new account

use anyhow::Result;
use serde::Serialize;

use super::Session;
use crate::output;

#[derive(Serialize)]
struct Registered {
    username: String,
}

pub fn run(session: &Session) -> Result<()> {
    let credentials = session.credentials()?;
    let ctx = session.context()?;
    let user = ctx.gate.register(&credentials)?;

    session.render(
        Registered {
            username: user.username,
        },
        |r| output::success(&format!("Registered {}", r.username)),
    )
}
