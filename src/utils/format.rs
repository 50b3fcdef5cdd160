//! Number formatting shared by the console, HTML and PDF renderers

/// Format number with thousand separators
///
/// # Examples
///
/// ```
/// # use smtp2go_usage::utils::format::format_number;
/// assert_eq!(format_number(1234), "1,234");
/// assert_eq!(format_number(1234567), "1,234,567");
/// ```
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(*c);
    }

    result
}

/// Format a delivery rate with two decimals, e.g. "98.50%"
pub fn format_rate(rate: f64) -> String {
    format!("{:.2}%", rate)
}
