//! Player-versus-player coordination: rooms and invites.
mod invite;
mod room;

pub use invite::{InviteBook, InviteError};
pub use room::{PvpRoom, Submission};
