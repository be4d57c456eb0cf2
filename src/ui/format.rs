// ---------------------------------------------------------------------------
// Number formatting for metric cards and tables
// ---------------------------------------------------------------------------

/// `1234567.891` → `"Rp 1,234,567.89"`.
pub fn currency(value: f64) -> String {
    format!("Rp {}", grouped(value, 2))
}

/// `1234567` → `"1,234,567"`.
pub fn count(value: i64) -> String {
    grouped(value as f64, 0)
}

/// Fixed-point with `,` thousands separators.
pub fn grouped(value: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut out = String::with_capacity(text.len() + int_part.len() / 3 + 1);
    // Rounding can turn -0.001 into "0.00"; keep the sign only for non-zero output.
    if value < 0.0 && text.bytes().any(|b| (b'1'..=b'9').contains(&b)) {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}
