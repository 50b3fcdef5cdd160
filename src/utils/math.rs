//! Rate calculation with zero-division handling

/// Calculate a percentage safely, returning 0.0 if total is zero.
///
/// Large values (>2^53) may lose precision when cast to f64; this is only
/// used for display-grade delivery rates.
///
/// # Examples
/// ```
/// use smtp2go_usage::utils::math::safe_percentage;
///
/// assert_eq!(safe_percentage(50, 100), 50.0);
/// assert_eq!(safe_percentage(0, 100), 0.0);
/// assert_eq!(safe_percentage(50, 0), 0.0);  // Zero-division guard
/// ```
#[inline]
pub fn safe_percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

/// Percentage of sent messages that were delivered
#[inline]
pub fn delivery_rate(delivered: u64, sent: u64) -> f64 {
    safe_percentage(delivered, sent)
}
