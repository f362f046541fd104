//! Timestamped text rendering.

use tubescript_core::TranscriptLine;

/// `mm:ss`, or `h:mm:ss` once the offset reaches an hour.
pub fn format_timestamp(ms: u64) -> String {
    let total_seconds = ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds / 60) % 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// One `[timestamp] text` line per cue, newline-joined, no trailing newline.
pub fn render(lines: &[TranscriptLine]) -> String {
    lines
        .iter()
        .map(|line| format!("[{}] {}", format_timestamp(line.start_ms), line.text))
        .collect::<Vec<_>>()
        .join("\n")
}
