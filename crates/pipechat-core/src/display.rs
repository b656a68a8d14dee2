//! Presentation helpers shared by the session and front ends.

/// Number of avatar colours a front end should provide. [`color_seed`] picks
/// an index into that palette.
pub const PALETTE_SIZE: u32 = 6;

/// Avatar initials for a name.
///
/// Multi-word names use the first letter of the first two words; single
/// words use their first two characters. Upper-cased. `?` for a blank name.
pub fn initials(name: &str) -> String {
    let mut words = name.split_whitespace();
    let initials: String = match (words.next(), words.next()) {
        (None, _) => return "?".to_string(),
        (Some(first), Some(second)) => {
            first.chars().take(1).chain(second.chars().take(1)).collect()
        },
        (Some(only), None) => only.chars().take(2).collect(),
    };
    initials.to_uppercase()
}

/// Stable palette index for a name: sum of its code points modulo
/// [`PALETTE_SIZE`].
pub fn color_seed(name: &str) -> u8 {
    let sum = name.chars().fold(0u32, |acc, c| acc.wrapping_add(u32::from(c)));
    (sum % PALETTE_SIZE) as u8
}

/// Human-readable file size, at most two decimals, trailing zeros dropped.
///
/// ```
/// use pipechat_core::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(1536), "1.5 KB");
/// assert_eq!(format_size(10 * 1024 * 1024), "10 MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{rounded:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{text} {}", UNITS[unit])
}
