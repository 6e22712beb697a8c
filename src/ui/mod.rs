//! Terminal presentation: colors and fragment progress.

mod progress;
mod theme;

pub use progress::FragmentProgress;
pub use theme::Style;
