//! Terminal presentation of gateway notices.

use penwright_gateway::{Notice, Notifier};

/// Writes notices to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &Notice) {
        eprintln!("{}", render(notice));
    }
}

fn render(notice: &Notice) -> String {
    format!("{}: {}", notice.level.as_str(), notice.text)
}
