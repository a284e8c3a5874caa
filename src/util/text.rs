use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Display width of a string in terminal columns (CJK and emoji count as 2).
///
/// ```
/// use stockroom::util::display_width;
///
/// assert_eq!(display_width("Atta"), 4);
/// assert_eq!(display_width("米"), 2);
/// ```
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate a string to fit `max_width` columns, appending "..." when cut.
///
/// Widths of 3 or less have no room for an ellipsis; as many characters as
/// fit are returned instead. Borrows when the input already fits.
///
/// ```
/// use stockroom::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Milk", 10), "Milk");
/// assert_eq!(truncate_to_width("Cold Drinks & Juices", 10), "Cold Dr...");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if max_width == 0 {
        return Cow::Borrowed("");
    }
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let budget = if max_width <= ELLIPSIS_WIDTH {
        max_width
    } else {
        max_width - ELLIPSIS_WIDTH
    };

    let mut used = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        end = idx + c.len_utf8();
    }

    if max_width <= ELLIPSIS_WIDTH {
        Cow::Owned(s[..end].to_string())
    } else {
        Cow::Owned(format!("{}{}", &s[..end], ELLIPSIS))
    }
}

/// SEC: Strip terminal control characters and ANSI escape sequences.
///
/// Item names, categories, and server messages are rendered straight into the
/// terminal, so anything that could move the cursor or recolour the screen is
/// removed. Tab, newline, and carriage return are kept.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    let needs_strip = s
        .bytes()
        .any(|b| b == 0x1b || b == 0x7f || (b < 0x20 && b != b'\t' && b != b'\n' && b != b'\r'));
    if !needs_strip {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\x1b' => match chars.peek() {
                // CSI: parameters until a final byte in 0x40..=0x7E
                Some('[') => {
                    chars.next();
                    for c in chars.by_ref() {
                        if ('\x40'..='\x7e').contains(&c) {
                            break;
                        }
                    }
                }
                // OSC: until BEL or ST (ESC \)
                Some(']') => {
                    chars.next();
                    while let Some(c) = chars.next() {
                        if c == '\x07' {
                            break;
                        }
                        if c == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            },
            '\t' | '\n' | '\r' => out.push(c),
            c if (c as u32) < 0x20 || c == '\x7f' => {}
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_truncation() {
        assert_eq!(truncate_to_width("Breakfast & Instant Food", 12), "Breakfast...");
    }

    #[test]
    fn test_exact_fit_borrows() {
        let out = truncate_to_width("Sweet Tooth", 11);
        assert!(matches!(out, Cow::Borrowed(_)));
    }

    #[test]
    fn test_cjk_truncation() {
        // 4 chars * 2 columns = 8; budget 7 leaves 4 columns before "..."
        assert_eq!(truncate_to_width("大米豆油", 7), "大米...");
    }

    #[test]
    fn test_narrow_widths() {
        assert_eq!(truncate_to_width("Pet Care", 0), "");
        assert_eq!(truncate_to_width("Pet Care", 1), "P");
        assert_eq!(truncate_to_width("Pet Care", 3), "Pet");
    }

    #[test]
    fn test_strip_clean_text_borrows() {
        assert!(matches!(
            strip_control_chars("Dairy, Bread & Eggs"),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn test_strip_ansi_sequences() {
        assert_eq!(strip_control_chars("\x1b[31mMilk\x1b[0m"), "Milk");
        assert_eq!(strip_control_chars("a\x1b]0;title\x07b"), "ab");
        assert_eq!(strip_control_chars("a\x1b]8;;x\x1b\\b"), "ab");
    }

    #[test]
    fn test_strip_keeps_whitespace() {
        assert_eq!(strip_control_chars("a\tb\nc\x00d\x7f"), "a\tb\ncd");
    }
}
