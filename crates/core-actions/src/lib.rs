//! Command application and file IO.
//!
//! `dispatch` applies one `Command` to the `EditorModel`: text edits, cursor
//! motion, save, find, quit confirmation and redraw requests. While a prompt
//! is active in the message bar, commands are routed to the prompt instead.
//! `io_ops` loads and saves documents preserving their line-ending style.

mod dispatcher;
pub mod io_ops;

pub use dispatcher::{DispatchResult, dispatch};
