use std::fmt::Write;

use clipq_core::{JobRowView, JobStatus, Notification, NotificationLevel, QueueViewModel};

/// Render the queue view as a plain-text block.
pub fn render(view: &QueueViewModel) -> String {
    let mut out = String::new();

    let processing = match (&view.current, view.is_processing) {
        (Some(current), true) => format!("processing {current}"),
        _ => "idle".to_string(),
    };
    let _ = writeln!(
        out,
        "Queue: {} jobs | {} | polling {}",
        view.job_count,
        processing,
        if view.polling { "on" } else { "off" }
    );

    for row in &view.jobs {
        let _ = writeln!(out, "{}", render_row(row));
    }
    if view.jobs.is_empty() {
        let _ = writeln!(out, "  (queue is empty)");
    }

    let draft = &view.draft;
    let _ = writeln!(
        out,
        "Draft: {} | default [{}] | vertical [{}]{}",
        draft.file_name.as_deref().unwrap_or("<no file>"),
        join(&draft.default_minutes),
        join(&draft.vertical_minutes),
        if draft.ready { " | ready" } else { "" }
    );
    if view.can_process_next {
        let _ = writeln!(out, "Next pending job can be started with `next`.");
    }
    out
}

fn render_row(row: &JobRowView) -> String {
    let marker = if row.is_current { '>' } else { ' ' };
    let mut line = format!(
        "{marker} {:<12} {:<10} {:>5.1}%  {}",
        row.job_id,
        status_label(row.status),
        row.progress,
        row.file_name
    );
    if let Some(error) = &row.error {
        let _ = write!(line, "  error: {error}");
    }
    if row.has_result {
        line.push_str("  [download]");
    }
    line
}

fn status_label(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Pending => "Pending",
        JobStatus::Processing => "Processing",
        JobStatus::Completed => "Completed",
        JobStatus::Failed => "Failed",
    }
}

pub fn render_notification(notification: &Notification) -> String {
    let level = match notification.level {
        NotificationLevel::Info => "info",
        NotificationLevel::Warning => "warning",
        NotificationLevel::Error => "error",
    };
    format!("[{level}] {}: {}", notification.title, notification.message)
}

fn join(minutes: &[u32]) -> String {
    minutes
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
