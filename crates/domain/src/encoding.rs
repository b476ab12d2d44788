//! Percent-encoding helpers matching the URL grammar's quoting rules.

/// Percent-decode `value`, keeping malformed escapes and invalid UTF-8 lossy.
#[must_use]
pub fn unquote(value: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(value.as_bytes())).into_owned()
}

/// Percent-encode `value`, leaving unreserved characters and any character
/// in `safe` untouched.
#[must_use]
pub fn quote(value: &str, safe: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for piece in value.split_inclusive(|ch: char| safe.contains(ch)) {
        match piece.chars().next_back().filter(|ch| safe.contains(*ch)) {
            Some(separator) => {
                let body = piece.strip_suffix(separator).unwrap_or(piece);
                encoded.push_str(&urlencoding::encode(body));
                encoded.push(separator);
            },
            None => encoded.push_str(&urlencoding::encode(piece)),
        }
    }
    encoded
}
