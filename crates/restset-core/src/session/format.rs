//! Display strings derived from session state.

/// `MM:SS`, rounding partial seconds up so a countdown never shows `00:00`
/// before it has actually finished.
pub fn format_clock(ms: u64) -> String {
    let total_secs = ms.div_ceil(1_000);
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// `M:SS` label for a custom slot, `--:--` when unset.
pub fn format_slot_label(seconds: u32) -> String {
    if seconds == 0 {
        return "--:--".to_string();
    }
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Set counter as shown next to the timer, e.g. `03 / 10`.
pub fn format_sets(current: u32, target: u32) -> String {
    format!("{current:02} / {target}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_rounds_up() {
        assert_eq!(format_clock(60_000), "01:00");
        assert_eq!(format_clock(59_001), "01:00");
        assert_eq!(format_clock(59_000), "00:59");
        assert_eq!(format_clock(1), "00:01");
        assert_eq!(format_clock(0), "00:00");
    }

    #[test]
    fn slot_labels() {
        assert_eq!(format_slot_label(0), "--:--");
        assert_eq!(format_slot_label(45), "0:45");
        assert_eq!(format_slot_label(125), "2:05");
    }

    #[test]
    fn sets_are_zero_padded() {
        assert_eq!(format_sets(3, 10), "03 / 10");
        assert_eq!(format_sets(12, 5), "12 / 5");
    }
}
