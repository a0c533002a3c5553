pub use crate::error::{ShellError, ShellResult};
pub use crate::state::Transition;
