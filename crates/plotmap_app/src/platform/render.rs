use chrono::{DateTime, TimeZone};
use plotmap_core::{AppViewModel, Notification, NotificationLevel};

pub fn render(view: &AppViewModel) -> Vec<String> {
    let plot_files = if view.plot_files.is_empty() {
        "(none)".to_string()
    } else {
        view.plot_files.join(", ")
    };
    let sample_file = view.sample_file.as_deref().unwrap_or("(none)");

    let mut lines = vec![
        format!("Plot files: {plot_files}"),
        format!("Sample file: {sample_file}"),
    ];

    if view.uploading {
        lines.push(format!(
            "Uploading [{}] {}%",
            progress_bar(view.progress),
            view.progress
        ));
    }

    if view.analysis_done {
        let overlay = view.overlay_url.as_deref().unwrap_or("(no overlay)");
        lines.push(format!("Analysis complete: {overlay}"));
    }

    let [[south, west], [north, east]] = view.bounds.to_pairs();
    lines.push(format!(
        "Bounds: [{south:.4}, {west:.4}] .. [{north:.4}, {east:.4}]"
    ));

    lines.extend(view.warnings.iter().map(|warning| format!("Warning: {warning}")));
    lines
}

pub fn format_notification<Tz: TimeZone>(notification: &Notification, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let level = match notification.level {
        NotificationLevel::Info => "info",
        NotificationLevel::Warning => "warning",
        NotificationLevel::Error => "error",
    };
    format!("[{}] {level}: {}", at.format("%H:%M:%S"), notification.message)
}

fn progress_bar(percent: u8) -> String {
    const WIDTH: usize = 20;
    let filled = usize::from(percent.min(100)) * WIDTH / 100;
    format!("{}{}", "#".repeat(filled), "-".repeat(WIDTH - filled))
}
