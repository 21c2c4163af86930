//! CLI output formatting.
//!
//! Tables for snapshots and colored JSON for one-shot queries.

use colored::Colorize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::spaces::types::Space;

/// Maximum width of the title column.
const TITLE_WIDTH: usize = 48;

/// Maximum width of the application column.
const APP_WIDTH: usize = 24;

/// One table row per window; empty spaces get a row of their own.
#[derive(Tabled)]
struct WindowRow {
    #[tabled(rename = "Space")]
    space: String,
    #[tabled(rename = "Window")]
    window: String,
    #[tabled(rename = "App")]
    app: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Focused")]
    focused: String,
}

fn rows(spaces: &[Space]) -> Vec<WindowRow> {
    let mut rows = Vec::new();

    for space in spaces {
        let label = if space.is_focused {
            space.id.bold().to_string()
        } else {
            space.id.clone()
        };

        if space.windows.is_empty() {
            rows.push(WindowRow {
                space: label,
                window: "-".dimmed().to_string(),
                app: String::new(),
                title: String::new(),
                focused: format_bool(false),
            });
            continue;
        }

        for (position, window) in space.windows.iter().enumerate() {
            rows.push(WindowRow {
                space: if position == 0 { label.clone() } else { String::new() },
                window: window.id.to_string(),
                app: truncate(window.app_name.as_deref().unwrap_or("?"), APP_WIDTH),
                title: truncate(&window.title, TITLE_WIDTH),
                focused: format_bool(window.is_focused),
            });
        }
    }

    rows
}

/// Prints a snapshot as a table.
pub fn print_spaces_table(spaces: &[Space]) {
    if spaces.is_empty() {
        println!("{}", "No spaces found.".dimmed());
        return;
    }

    let table = Table::new(rows(spaces))
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..2)).with(Alignment::right()))
        .with(Modify::new(Columns::new(4..5)).with(Alignment::center()))
        .to_string();

    let windows: usize = spaces.iter().map(|space| space.windows.len()).sum();
    println!("{}", format!("Spaces ({}), windows ({windows})", spaces.len()).bold());
    println!("{table}");
}

/// Prints JSON with syntax highlighting.
///
/// Keys are cyan, strings green, numbers yellow, booleans and null magenta.
pub fn print_highlighted_json(value: &serde_json::Value) {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string());
    println!("{}", highlight_json(&pretty));
}

/// Colors a pretty-printed JSON document.
fn highlight_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len() * 2);
    let mut chars = json.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        match ch {
            '"' => {
                let mut end = json.len();
                let mut escaped = false;
                for (idx, c) in chars.by_ref() {
                    if escaped {
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == '"' {
                        end = idx + 1;
                        break;
                    }
                }

                let literal = &json[start..end];
                let is_key = json[end..].trim_start().starts_with(':');
                let colored = if is_key { literal.cyan() } else { literal.green() };
                out.push_str(&colored.to_string());
            }
            '{' | '}' | '[' | ']' => out.push_str(&ch.to_string().white().bold().to_string()),
            ':' | ',' => out.push_str(&ch.to_string().white().to_string()),
            c if c.is_whitespace() => out.push(c),
            _ => {
                let mut end = start + ch.len_utf8();
                while let Some(&(idx, c)) = chars.peek() {
                    if c.is_whitespace() || matches!(c, ',' | '}' | ']') {
                        break;
                    }
                    end = idx + c.len_utf8();
                    chars.next();
                }

                let scalar = &json[start..end];
                let colored = match scalar {
                    "true" | "false" | "null" => scalar.magenta(),
                    _ => scalar.yellow(),
                };
                out.push_str(&colored.to_string());
            }
        }
    }

    out
}

/// Truncates a string to a maximum number of characters, adding ellipsis if needed.
///
/// Counts characters, not bytes.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 1 {
        return "…".to_string();
    }

    let kept: String = s.chars().take(max_chars - 1).collect();
    format!("{kept}…")
}

/// Formats a boolean as a colored check mark.
#[must_use]
pub fn format_bool(value: bool) -> String {
    if value { "✓".green().to_string() } else { "✗".red().to_string() }
}
