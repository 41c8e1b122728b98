/// Round a currency amount to two decimal places, half away from zero.
/// Totals and report figures are rounded once, at the point they are
/// produced, never re-rounded on read.
pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
