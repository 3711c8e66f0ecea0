use std::sync::{Arc, Once};

use indicatif::{ProgressBar, ProgressStyle};
use lima_fetch::Progress;

const BAR_TEMPLATE: &str = "{bar:40.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";
const SPINNER_TEMPLATE: &str = "{spinner:.blue.bold} {bytes} ({bytes_per_sec})";

/// A transfer bar that draws nothing until the first chunk arrives.
pub fn transfer_bar(enabled: bool) -> ProgressBar {
    if enabled { ProgressBar::no_length() } else { ProgressBar::hidden() }
}

/// Drive `bar` from download progress. Sources without a length get a spinner.
pub fn progress_callback(bar: ProgressBar) -> Arc<dyn Fn(&Progress) + Send + Sync> {
    let styled = Once::new();
    Arc::new(move |progress: &Progress| {
        styled.call_once(|| {
            let template = match progress.total_bytes {
                Some(total) => {
                    bar.set_length(total);
                    BAR_TEMPLATE
                }
                None => SPINNER_TEMPLATE,
            };
            if let Ok(style) = ProgressStyle::with_template(template) {
                bar.set_style(style);
            }
        });
        bar.set_position(progress.bytes_downloaded);
    })
}
