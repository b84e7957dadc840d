use std::fmt::Display;

use colored::*;
use lanprobe_common::network::host::ScanResult;
use tracing::info;

use crate::terminal::colors;
use crate::terminal::logging::PRINT_TARGET;

pub const TOTAL_WIDTH: usize = 64;

#[macro_export]
macro_rules! mprint {
    () => {
        $crate::terminal::print::print("");
    };
    ($msg:expr) => {
        $crate::terminal::print::print($msg);
    };
}

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, raw_msg = msg);
}

pub fn header(msg: &str) {
    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = formatted.chars().count();

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right)
    )
    .bright_black();

    print(&format!("{}", line));
}

pub fn fat_separator() {
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH).bright_black();
    print(&format!("{}", sep));
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{}{}{}", space, msg, space));
}

pub fn aligned_line<V: Display>(key: &str, width: usize, value: V) {
    let dots: String = ".".repeat((width + 1).saturating_sub(key.len()));
    print(&format!(
        "{} {}{}{} {}",
        ">".color(colors::SEPARATOR),
        key.color(colors::PRIMARY),
        dots.color(colors::SEPARATOR),
        ":".color(colors::SEPARATOR),
        value.to_string().color(colors::TEXT_DEFAULT)
    ));
}

/// Live notice for a host the moment it answers.
pub fn host_found(result: &ScanResult) {
    let name = result.reverse_name.as_deref().filter(|n| !n.is_empty());
    let mut line = format!(
        "{} {} {} {}",
        "[+]".green().bold(),
        result.address.to_string().color(colors::IPV4_ADDR),
        format!("via {}", result.method.label()).color(colors::SEPARATOR),
        result.device_class.as_str().color(colors::ACCENT),
    );
    if let Some(mac) = result.mac_string() {
        line.push_str(&format!(" {}", mac.color(colors::MAC_ADDR)));
    }
    if let Some(name) = name {
        line.push_str(&format!(" {}", name.color(colors::PRIMARY)));
    }
    print(&line);
}

/// One line of the final text report, dimmed for dead hosts.
pub fn result_line(result: &ScanResult) {
    let line = result.format_line();
    if result.alive {
        print(&format!("{}", line.color(colors::TEXT_DEFAULT)));
    } else {
        print(&format!("{}", line.color(colors::DEAD)));
    }
}

pub fn no_results() {
    centerln(&format!("{}", "no hosts answered".red().bold()));
}
