use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Case- and accent-insensitive comparison key: lowercase, canonical
/// decomposition, combining marks stripped. Idempotent, so keys can be
/// re-normalized without drift.
pub fn normalize(input: &str) -> String {
    input
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// File-name-safe slug: normalize, collapse non-alphanumeric runs to a
/// single `-`, trim leading/trailing dashes.
pub fn slug(input: &str) -> String {
    let mut out = String::new();
    let mut pending_dash = false;
    for c in normalize(input).chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }
    out
}
