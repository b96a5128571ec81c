use colored::Colorize;
use supports_color::Stream;

use crate::diff::{ChangeEvent, ChangeStatus};

/// Prints one `[STATUS] : path` line per event to stdout
pub fn print_change_events(events: &[ChangeEvent]) {
    let colorize = supports_color::on(Stream::Stdout).is_some();
    for event in events {
        println!("{}", render_line(event, colorize));
    }
}

pub fn render_line(event: &ChangeEvent, colorize: bool) -> String {
    if !colorize {
        return event.to_string();
    }

    let status = event.status().to_string();
    let tag = match event.status() {
        ChangeStatus::Create => status.as_str().green(),
        ChangeStatus::Delete => status.as_str().red(),
        ChangeStatus::Change => status.as_str().yellow(),
    };
    format!("[{}] : {}", tag, event.path().display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_line_matches_event_display() {
        let event = ChangeEvent::Changed("/srv/a.txt".into());

        assert_eq!(render_line(&event, false), "[CHANGE] : /srv/a.txt");
    }

    #[test]
    fn colored_line_keeps_status_and_path() {
        colored::control::set_override(true);
        let event = ChangeEvent::Created("/srv/new.txt".into());

        let line = render_line(&event, true);

        assert!(line.contains("CREATE"));
        assert!(line.ends_with("] : /srv/new.txt"));
    }
}
