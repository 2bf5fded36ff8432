//! @ai:module:intent Format palettes, annotation sets and audit reports (JSON, text)
//! @ai:module:layer infrastructure
//! @ai:module:public_api OutputFormat, format_report, format_palette, format_annotations, render_highlighted, to_json
//! @ai:module:depends_on validator, palette, annotation
//! @ai:module:stateless true

use crate::annotation::SpanAnnotation;
use crate::palette::Palette;
use crate::validator::ValidationReport;
use colored::{Color, Colorize};
use serde::Serialize;

/// @ai:intent Output format options
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
}

/// @ai:intent Format any serializable value as JSON
/// @ai:effects pure
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(value).unwrap_or_default()
    } else {
        serde_json::to_string(value).unwrap_or_default()
    }
}

/// @ai:intent Map a palette color string to a terminal color
/// @ai:effects pure
/// @ai:example ("#00ff00") -> TrueColor { 0, 255, 0 }
fn terminal_color(name: &str) -> Color {
    if let Some(hex) = name.strip_prefix('#') {
        if let Some(rgb) = parse_hex(hex) {
            return Color::TrueColor {
                r: rgb.0,
                g: rgb.1,
                b: rgb.2,
            };
        }
    }

    match name.to_ascii_lowercase().as_str() {
        "orange" => Color::TrueColor { r: 255, g: 165, b: 0 },
        "pink" => Color::TrueColor { r: 255, g: 192, b: 203 },
        "gray" | "grey" => Color::TrueColor { r: 128, g: 128, b: 128 },
        other => other.parse().unwrap_or(Color::White),
    }
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// @ai:intent Format a resolved palette
/// @ai:effects pure
pub fn format_palette(palette: &Palette, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(&palette_map(palette), false),
        OutputFormat::JsonPretty => to_json(&palette_map(palette), true),
        OutputFormat::Text => {
            let mut output = String::new();
            for (label, color) in palette.iter() {
                output.push_str(&format!(
                    "{} {}\n",
                    "■".color(terminal_color(color)),
                    format!("{} = {}", label.bold(), color)
                ));
            }
            output
        }
    }
}

fn palette_map(palette: &Palette) -> serde_json::Map<String, serde_json::Value> {
    palette
        .iter()
        .map(|(label, color)| (label.to_string(), serde_json::Value::from(color)))
        .collect()
}

/// @ai:intent Format an annotation set
/// @ai:effects pure
pub fn format_annotations(annotations: &[SpanAnnotation], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(&annotations, false),
        OutputFormat::JsonPretty => to_json(&annotations, true),
        OutputFormat::Text => {
            let mut output = String::new();
            for ann in annotations {
                output.push_str(&format!(
                    "[{}, {}) {}",
                    ann.start,
                    ann.end,
                    ann.tag.cyan()
                ));
                if let Some(text) = &ann.text {
                    output.push_str(&format!(" \"{}\"", text));
                }
                if let Some(color) = &ann.color {
                    output.push_str(&format!(" {}", color.dimmed()));
                }
                output.push('\n');
            }
            output.push_str(&format!("{} annotations\n", annotations.len()));
            output
        }
    }
}

/// @ai:intent Render text with each span highlighted in its palette color
/// @ai:post later annotations draw over earlier ones where spans overlap
/// @ai:effects pure
pub fn render_highlighted(text: &str, annotations: &[SpanAnnotation], palette: &Palette) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut owner: Vec<Option<&str>> = vec![None; chars.len()];

    for ann in annotations {
        let end = ann.end.min(chars.len());
        for slot in owner.iter_mut().take(end).skip(ann.start) {
            *slot = Some(ann.tag.as_str());
        }
    }

    let mut output = String::new();
    let mut i = 0;
    while i < chars.len() {
        let tag = owner[i];
        let mut j = i;
        while j < chars.len() && owner[j] == tag {
            j += 1;
        }

        let segment: String = chars[i..j].iter().collect();
        match tag.and_then(|t| palette.color_of(t)) {
            Some(color) => {
                output.push_str(&segment.on_color(terminal_color(color)).black().to_string())
            }
            None => output.push_str(&segment),
        }
        i = j;
    }

    output
}

/// @ai:intent Format an audit report as a string
/// @ai:effects pure
pub fn format_report(report: &ValidationReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string(report).unwrap_or_default(),
        OutputFormat::JsonPretty => serde_json::to_string_pretty(report).unwrap_or_default(),
        OutputFormat::Text => format_report_text(report),
    }
}

/// @ai:intent Format an audit report as human-readable text
/// @ai:effects pure
fn format_report_text(report: &ValidationReport) -> String {
    let mut output = String::new();

    for issue in &report.issues {
        let location = match (&issue.source, issue.index) {
            (Some(path), Some(index)) => format!("{}#{}", path.display(), index),
            (Some(path), None) => path.display().to_string(),
            (None, Some(index)) => format!("#{}", index),
            (None, None) => String::new(),
        };

        output.push_str(&format!(
            "{} {} - {} ({})\n",
            "ERROR".red().bold(),
            location.dimmed(),
            issue.message,
            issue.code.dimmed()
        ));

        if let Some(suggestion) = &issue.suggestion {
            output.push_str(&format!("  {} {}\n", "hint:".cyan(), suggestion));
        }
    }

    output.push('\n');
    output.push_str(&format!(
        "Checked {} documents, {} annotations\n",
        report.documents_checked, report.annotations_checked
    ));

    if report.passed() {
        output.push_str(&format!("{} No issues found\n", "OK".green().bold()));
    } else {
        output.push_str(&format!(
            "{} issues\n",
            report.issues.len().to_string().red().bold()
        ));
    }

    output
}
