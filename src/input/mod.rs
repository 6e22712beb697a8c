//! Source text intake: size-capped reading and fragment splitting.

mod fragments;
mod reader;

pub use fragments::{Fragment, split_fragments};
pub use reader::{MAX_INPUT_SIZE, read_input};
