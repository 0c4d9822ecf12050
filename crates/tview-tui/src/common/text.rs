//! Text helpers for painting server-supplied strings.

use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Cuts `text` to `max_width` terminal columns, ending in `…` when shortened.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Strips escape bytes and expands tabs. Message bodies are painted
/// verbatim, so control sequences must not reach the terminal.
pub fn clean_for_terminal(s: &str) -> Cow<'_, str> {
    if s.contains(['\x1b', '\t', '\r']) {
        Cow::Owned(
            s.replace('\x1b', "")
                .replace('\t', "    ")
                .replace('\r', ""),
        )
    } else {
        Cow::Borrowed(s)
    }
}
