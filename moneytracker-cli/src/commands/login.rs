//! Login command - verify credentials
//!
//! There are no sessions; this only tells the caller whether the
//! credentials would be accepted by the other commands.

use anyhow::Result;
use serde::Serialize;

use super::Session;
use crate::output;

#[derive(Serialize)]
struct Authenticated {
    username: String,
}

pub fn run(session: &Session) -> Result<()> {
    let credentials = session.credentials()?;
    let ctx = session.context()?;
    ctx.gate.authenticate(&credentials)?;

    session.render(
        Authenticated {
            username: credentials.username,
        },
        |a| output::success(&format!("Logged in as {}", a.username)),
    )
}
