pub mod backup;
pub mod bundle;
pub mod catalog;
pub mod codex;
pub mod config;
pub mod error;
pub mod generate;
pub mod io;
pub mod manifest;
pub mod paths;
pub mod settings;
pub mod sync;
pub mod update;
pub mod upgrade;
pub mod verify;
pub mod version;

pub use error::{ErrorKind, PilotError, Result};
