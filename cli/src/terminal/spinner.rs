use colored::*;
use indicatif::ProgressStyle;
use tracing::{Span, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::terminal::colors;

const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

fn style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {msg}")
        .expect("static spinner template")
        .tick_strings(TICKS)
}

/// A span that shows a spinner while it is entered.
pub fn scan_span(total: usize) -> Span {
    let span = info_span!("scan", indicatif.pb_show = true);
    span.pb_set_style(&style());
    span.pb_set_message(&format!("Probing {} addresses...", total.to_string().bold()));
    span
}

pub fn report_progress(span: &Span, found: usize) {
    span.pb_set_message(
        &format!(
            "Identified {} so far...",
            format!("{} hosts", found).green().bold()
        )
        .color(colors::TEXT_DEFAULT)
        .to_string(),
    );
}
