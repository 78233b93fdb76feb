/// Masks a lease code for public display, e.g. `1234-5678-90ab-cdef` becomes
/// `1234...cdef`.
///
/// Keeps the first 4 characters and the first 4 characters after the last
/// hyphen (the last 4 characters when no hyphen is followed by content).
/// Missing, blank, or codes shorter than 8 characters yield an empty string.
pub fn mask_lease_code_for_public_display(code: Option<&str>) -> String {
    let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) else {
        return String::new();
    };

    let chars: Vec<char> = code.chars().collect();
    if chars.len() < 8 {
        return String::new();
    }

    let first_four: String = chars[..4].iter().collect();
    let last_four: String = match chars.iter().rposition(|c| *c == '-') {
        Some(idx) if idx < chars.len() - 1 => chars[idx + 1..].iter().take(4).collect(),
        _ => chars[chars.len() - 4..].iter().collect(),
    };

    format!("{first_four}...{last_four}")
}
