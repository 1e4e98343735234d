use colored::Colorize;
use diary_common::{NoticeKind, Notifier};

/// Prints notices as colored terminal lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        match kind {
            NoticeKind::Success => println!("  {} {}", "✓".green(), message),
            NoticeKind::Error => eprintln!("  {} {}", "✗".red(), message.red()),
        }
    }
}
