//! Delimiter normalization.
//!
//! User programs register delimiters in source-literal form, so the engine
//! sees the two-character sequence backslash-`n` rather than an actual
//! newline. Normalization maps those escape spellings to the characters they
//! denote and leaves everything else alone. Only the normalized form is ever
//! stored or compared against.

/// Normalize a delimiter to its canonical form.
///
/// Pure and total. The escape spellings `\n`, `\r`, and `\r\n` (as literal
/// backslash sequences) map to the control characters they name; any other
/// input — including strings that already contain real control characters,
/// multi-character markers, or numeric-looking strings like `"10"` — is
/// returned unchanged. Idempotent: normalizing an already-normalized
/// delimiter is the identity.
pub fn normalize_delimiter(raw: &str) -> &str {
    match raw {
        "\\n" => "\n",
        "\\r" => "\r",
        "\\r\\n" => "\r\n",
        other => other,
    }
}
