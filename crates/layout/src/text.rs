//! Fixed-width text heuristics. No font metrics are consulted: every
//! character is assumed to be half as wide as the font size.

use std::borrow::Cow;

/// Width of one character as a fraction of the font size.
pub const CHAR_WIDTH_FACTOR: f32 = 0.5;

/// Estimated rendered width of `text` at `font_size`.
pub fn estimate_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * CHAR_WIDTH_FACTOR
}

/// Shortens `title` to exactly `max_chars` characters, the last of which
/// form `ellipsis`, when it is longer than `max_chars`. At least one
/// character of the title is always kept.
pub fn truncate_title<'a>(title: &'a str, max_chars: usize, ellipsis: &str) -> Cow<'a, str> {
    if title.chars().count() <= max_chars {
        return Cow::Borrowed(title);
    }
    let keep = max_chars.saturating_sub(ellipsis.chars().count()).max(1);
    let mut out: String = title.chars().take(keep).collect();
    out.push_str(ellipsis);
    Cow::Owned(out)
}
