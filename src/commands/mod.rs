/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `predict` runs one select and predict cycle for a single file
- `session` is the interactive readline loop
- `history` lists or clears the prediction history

`render` and `session_commands` hold the shared output formatting and the
interactive command parser.
*/

pub mod history;
pub mod predict;
pub mod render;
pub mod session;
pub mod session_commands;

pub use history::handle_history;
pub use predict::run_predict;
pub use session::run_session;
