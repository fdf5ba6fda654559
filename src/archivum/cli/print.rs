use archivum::commands::{CmdMessage, MessageLevel};
use archivum::error::Result;
use archivum::model::{Archive, Source};
use archivum::snapshot::SnapshotInfo;
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::path::Path;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const ID_WIDTH: usize = 16;
const NAME_WIDTH: usize = 28;
const TIME_WIDTH: usize = 14;
const HIDDEN_MARKER: &str = "⊘";

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_archives(archives: &[Archive]) {
    if archives.is_empty() {
        println!("No archives yet.");
        return;
    }
    for archive in archives {
        println!("{}", archive.name.bold());
    }
}

pub(super) fn print_sources(sources: &[Source]) {
    if sources.is_empty() {
        println!("No files in this archive.");
        return;
    }

    // id, marker, filename, description
    let desc_width = LINE_WIDTH.saturating_sub(ID_WIDTH + 2 + NAME_WIDTH + 2);
    for source in sources {
        let marker = if source.is_visible() {
            " ".to_string()
        } else {
            HIDDEN_MARKER.red().to_string()
        };
        let id = format!("{:>width$}", source.id, width = ID_WIDTH);
        let name = pad_to_width(&truncate_to_width(&source.filename, NAME_WIDTH), NAME_WIDTH);
        let desc = truncate_to_width(source.display_description(), desc_width);
        let line = format!("{} {} {} {}", id.dimmed(), marker, name, desc);
        if source.is_visible() {
            println!("{}", line);
        } else {
            println!("{}", line.dimmed());
        }
    }
}

pub(super) fn print_snapshots(snapshots: &[SnapshotInfo]) {
    for snapshot in snapshots {
        println!(
            "{:<12} {:>10} {}",
            snapshot.name,
            format_size(snapshot.size),
            format_time_ago(snapshot.created_at).dimmed()
        );
    }
}

pub(super) fn print_version(version: i64, json: bool) -> Result<()> {
    if json {
        let body = serde_json::json!({ "version": version });
        println!("{}", serde_json::to_string(&body)?);
    } else {
        println!("{}", version);
    }
    Ok(())
}

pub(super) fn print_manifest_path(path: &Path) {
    println!("{}", path.display().to_string().dimmed());
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn pad_to_width(s: &str, width: usize) -> String {
    let padding = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(padding))
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
    }
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(timestamp);

    let formatter = Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());

    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
