pub mod scripted;
#[cfg(feature = "cli")]
pub mod terminal;

pub use scripted::ScriptedFrontend;
#[cfg(feature = "cli")]
pub use terminal::TerminalFrontend;
