//! Rounding and digit grouping shared by the calculator and the formatters.

/// Round to the nearest integer with ties going toward positive infinity
/// (`2.5 -> 3`, `-2.5 -> -2`), the rounding the keypad display uses.
pub(crate) fn round_half_up(x: f64) -> f64 {
    let r = x.round();
    if (r - x).abs() == 0.5 {
        x.ceil()
    } else {
        r
    }
}

/// Insert a comma every three digits from the right of a plain digit string.
pub(crate) fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Render an already-rounded value as a grouped integer, keeping its sign.
/// Negative zero renders as "0".
pub(crate) fn grouped_integer(rounded: f64) -> String {
    if !rounded.is_finite() {
        return rounded.to_string();
    }
    if rounded == 0.0 {
        return "0".to_string();
    }
    let digits = format!("{:.0}", rounded.abs());
    let grouped = group_thousands(&digits);
    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
