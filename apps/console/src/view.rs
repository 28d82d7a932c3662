//! Plain-text rendering of the console state.

use std::fmt::Write as _;

use chrono::Local;
use console_core::{ConsoleState, GaugeBand, LinkState, StatusDisplay, StatusTone};

const GAUGE_CELLS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Toggle,
    Show,
    Quit,
    Help,
}

pub fn parse_command(line: &str) -> Command {
    match line.trim().to_ascii_lowercase().as_str() {
        "t" | "toggle" => Command::Toggle,
        "" | "s" | "show" => Command::Show,
        "q" | "quit" | "exit" => Command::Quit,
        _ => Command::Help,
    }
}

pub const HELP: &str = "commands: [t]oggle mode, [s]how, [q]uit";

fn link_label(link: LinkState) -> &'static str {
    match link {
        LinkState::Connecting => "CONNECTING",
        LinkState::Online => "ONLINE",
        LinkState::Lost => "LINK LOST",
    }
}

fn tone_tag(tone: StatusTone) -> &'static str {
    match tone {
        StatusTone::Neutral => "",
        StatusTone::Positive => " [OK]",
        StatusTone::Alert => " [ALERT]",
    }
}

fn band_label(band: GaugeBand) -> &'static str {
    match band {
        GaugeBand::Good => "good",
        GaugeBand::Fair => "fair",
        GaugeBand::Poor => "poor",
    }
}

fn gauge_bar(percent: u8) -> String {
    let filled = (usize::from(percent) * GAUGE_CELLS + 50) / 100;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(GAUGE_CELLS - filled)
    )
}

pub fn render(state: &ConsoleState, feed_url: &str) -> String {
    let status = state.status();
    let display = StatusDisplay::from(status);
    let mut out = String::new();

    let _ = writeln!(out, "TRAILBACK.AI  [{}]", link_label(state.link_state()));
    let _ = writeln!(out, "STATUS      {}{}", status.status, tone_tag(display.tone));
    let _ = writeln!(out, "MODE        {}", status.mode);
    let _ = writeln!(
        out,
        "CONFIDENCE  {} {:>3}% ({})  SIGNAL {}",
        gauge_bar(display.gauge_percent),
        display.gauge_percent,
        band_label(display.gauge),
        display.signal.label()
    );
    let best_match = status
        .best_match_id()
        .map_or_else(|| "none".to_string(), |id| id.to_string());
    let _ = writeln!(out, "BEST MATCH  {best_match}");
    let _ = writeln!(out, "FEED        {feed_url}");
    let _ = writeln!(out, "ACTION      [t] {}", display.toggle_label);
    let _ = writeln!(out, "LANDMARK LOG ({})", state.timeline().len());

    if state.timeline().is_empty() {
        let _ = writeln!(out, "  No landmarks captured yet.");
    }
    for entry in state.timeline().newest_first() {
        let _ = writeln!(
            out,
            "  {}  {}",
            entry.captured_at.with_timezone(&Local).format("%H:%M:%S"),
            entry.id
        );
    }
    out
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
