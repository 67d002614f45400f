/// Left-pads `field` with `'0'` to exactly `width` bytes, the fixed-width
/// encoding used for every name field on the wire.
///
/// Returns `None` when the field does not fit.
///
/// # Examples
///
/// ```
/// assert_eq!(dvnet::util::pad_field("H1", 5), Some("000H1".to_string()));
/// assert_eq!(dvnet::util::pad_field("3", 5), Some("00003".to_string()));
/// assert_eq!(dvnet::util::pad_field("TOOLONG", 5), None);
/// ```
pub fn pad_field(field: &str, width: usize) -> Option<String> {
    if field.len() > width {
        return None;
    }
    let mut out = "0".repeat(width - field.len());
    out.push_str(field);
    Some(out)
}

/// Strips the `'0'` padding from a fixed-width field.
///
/// An all-zero field decodes to `"0"` rather than the empty string, so a
/// numeric zero address survives a round trip.
///
/// # Examples
///
/// ```
/// assert_eq!(dvnet::util::strip_field("000H1"), "H1");
/// assert_eq!(dvnet::util::strip_field("00000"), "0");
/// ```
pub fn strip_field(field: &str) -> &str {
    let stripped = field.trim_start_matches('0');
    if stripped.is_empty() && !field.is_empty() {
        &field[field.len() - 1..]
    } else {
        stripped
    }
}
