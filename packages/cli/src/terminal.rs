use client::{NotificationBoard, Navigator, Notifier, Toast, ToastLevel, ToastTag};
use console::style;

/// Prints notifications to stderr and keeps the latest one per key.
#[derive(Default)]
pub struct ConsoleNotifier {
    board: NotificationBoard,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self, key: &str) -> Option<Toast> {
        self.board.get(key)
    }
}

impl Notifier for ConsoleNotifier {
    fn show(&self, toast: Toast) {
        let title = match toast.level {
            ToastLevel::Success => style(&toast.title).green().bold(),
            ToastLevel::Info => style(&toast.title).cyan().bold(),
            ToastLevel::Warning => style(&toast.title).yellow().bold(),
            ToastLevel::Error => style(&toast.title).red().bold(),
        };
        let tag = match toast.tag {
            Some(ToastTag::IntegrityViolation) => format!(" {}", style("[integrity]").red()),
            Some(ToastTag::AlreadySolved) => format!(" {}", style("[solved]").dim()),
            None => String::new(),
        };
        match &toast.description {
            Some(description) => eprintln!("{title}{tag} {}", style(description).dim()),
            None => eprintln!("{title}{tag}"),
        }
        self.board.show(toast);
    }
}

/// There is no login page in a terminal; point at the command instead.
pub struct LoginHint;

impl Navigator for LoginHint {
    fn navigate(&self, _route: &str) {
        eprintln!(
            "{} run {} to sign in",
            style("!").yellow().bold(),
            style("cdsctf login --account <name>").bold()
        );
    }
}
