//! Background tasks driving connected players.
mod session;

pub(crate) use session::{Command, SessionWorker};
