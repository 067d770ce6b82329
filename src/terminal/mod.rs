//! Terminal front end: the result list, its scroll viewport and the REPL.

mod repl;
mod view;

pub use repl::{parse_command, Repl, ReplCommand};
pub use view::TerminalView;
