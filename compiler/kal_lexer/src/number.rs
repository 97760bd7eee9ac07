//! Numeric literal conversion.

/// Convert a `[0-9.]+` run to `f64` the way C `strtod` would.
///
/// The longest prefix that forms a valid decimal is used: `1.2.3` is `1.2`,
/// `4.` is `4.0`, `.5` is `0.5`. A run with no digits before the second dot,
/// such as `.` or `..1`, converts to `0.0`. Conversion is locale-independent.
pub fn parse_number(run: &str) -> f64 {
    let prefix = match run.match_indices('.').nth(1) {
        Some((second_dot, _)) => &run[..second_dot],
        None => run,
    };
    prefix.parse::<f64>().unwrap_or(0.0)
}
