use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::IsTerminal;

/// Fragment counter drawn on stderr.
///
/// Hidden when stderr is not a terminal or output is quiet. Clears itself
/// when dropped.
pub struct FragmentProgress {
    bar: ProgressBar,
}

impl FragmentProgress {
    pub fn new(total: usize, quiet: bool) -> Self {
        let bar = if quiet || !std::io::stderr().is_terminal() {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr());
            // A bad template only loses the styling.
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner} [{bar:30}] {pos}/{len} fragments ({elapsed})")
            {
                bar.set_style(style.progress_chars("=> "));
            }
            bar
        };
        Self { bar }
    }

    pub fn inc(&self) {
        self.bar.inc(1);
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl Drop for FragmentProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}
