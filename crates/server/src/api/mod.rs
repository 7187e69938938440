//! Types downstream clients interact with.
mod errors;
mod handle;
mod providers;

pub use errors::{Result, ServiceError};
pub use handle::{PlayerConnection, PlayerHandle};
pub use providers::{ActionProvider, RandomSkillProvider, ScriptedProvider, StrongestSkillProvider};
