//! Progress bar utilities

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Create a standard progress bar, hidden when logging is quieted
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if log::max_level() < log::LevelFilter::Warn {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("##-"));
    }
    pb.set_message(message.to_string());
    pb
}
