//! Human readable durations, in the style `350ms`, `1.2s`, `4m5s`, `2h3m`.

/// Coarse duration for listings: milliseconds below a second, whole seconds
/// below an hour, whole minutes above.
pub fn format_duration(ms: u64) -> String {
    if ms < 1_000 {
        return format!("{ms}ms");
    }
    if ms < 3_600_000 {
        let secs = (ms + 500) / 1_000;
        return hms(secs);
    }
    let mins = (ms + 30_000) / 60_000;
    hms(mins * 60)
}

/// Duration rounded to the nearest 100ms, used for per-task timings.
pub fn format_precise(ms: u64) -> String {
    let rounded = (ms + 50) / 100 * 100;
    if rounded < 1_000 {
        return format!("{rounded}ms");
    }
    if rounded < 60_000 {
        let tenths = rounded / 100;
        return if tenths % 10 == 0 {
            format!("{}s", tenths / 10)
        } else {
            format!("{}.{}s", tenths / 10, tenths % 10)
        };
    }
    hms((rounded + 500) / 1_000)
}

fn hms(total_secs: u64) -> String {
    let h = total_secs / 3600;
    let m = (total_secs % 3600) / 60;
    let s = total_secs % 60;
    match (h, m) {
        (0, 0) => format!("{s}s"),
        (0, _) => format!("{m}m{s}s"),
        _ if s == 0 => format!("{h}h{m}m"),
        _ => format!("{h}h{m}m{s}s"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coarse_durations() {
        assert_eq!(format_duration(350), "350ms");
        assert_eq!(format_duration(1_499), "1s");
        assert_eq!(format_duration(65_000), "1m5s");
        assert_eq!(format_duration(2 * 3_600_000 + 3 * 60_000 + 10_000), "2h3m");
    }

    #[test]
    fn precise_durations() {
        assert_eq!(format_precise(0), "0ms");
        assert_eq!(format_precise(349), "300ms");
        assert_eq!(format_precise(1_230), "1.2s");
        assert_eq!(format_precise(2_000), "2s");
        assert_eq!(format_precise(61_000), "1m1s");
    }
}
