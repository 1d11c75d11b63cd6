//! This module aggregates all the command modules for the bot.

/// General purpose commands (e.g., help, fun facts).
pub mod general;
/// The single-ballot voting system (`vote`, `cast`).
pub mod voting;
