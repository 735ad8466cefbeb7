//! Builtins beyond the core shell: reminders, file search, code runner, tutorials,
//! saved SSH connections, definitions, file preview and archiving.
//!
//! Each one is a thin layer over a file-backed store or a pass-through to an
//! external tool via the shell's [`Launcher`](crate::external::Launcher).

mod compress;
pub mod connections;
pub mod definitions;
mod learn;
mod preview;
pub mod reminders;
mod run_code;
mod search;

pub(crate) use compress::Compress;
pub(crate) use connections::Ssh;
pub(crate) use definitions::Define;
pub(crate) use learn::Learn;
pub(crate) use preview::Preview;
pub(crate) use reminders::Remind;
pub(crate) use run_code::Run;
pub(crate) use search::Search;
