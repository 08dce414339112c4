//! `application/x-www-form-urlencoded` query strings.
//!
//! Spaces encode as `+`; everything except ASCII alphanumerics and `*-._` is
//! percent-encoded.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

const FORM: &AsciiSet = &NON_ALPHANUMERIC.remove(b'*').remove(b'-').remove(b'.').remove(b'_');

/// Encode one key or value
pub fn encode(value: &str) -> String {
    // '%' itself is escaped, so every "%20" came from a space
    utf8_percent_encode(value, FORM).to_string().replace("%20", "+")
}

/// Decode one key or value; invalid UTF-8 is replaced
pub fn decode(value: &str) -> String {
    percent_decode_str(&value.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

/// Decoded `(key, value)` pairs in order. A leading `?` is ignored, empty
/// segments are skipped and a key without `=` gets an empty value.
pub fn parse(query: &str) -> Vec<(String, String)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.split_once('=') {
            Some((key, value)) => (decode(key), decode(value)),
            None => (decode(segment), String::new()),
        })
        .collect()
}

/// Encode pairs as `k=v&k=v`
pub fn serialize<K, V>(pairs: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", encode(key.as_ref()), encode(value.as_ref())))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn encodes_like_html_forms() {
        assert_eq!(encode("Women in Engineering"), "Women+in+Engineering");
        assert_eq!(encode("title,date"), "title%2Cdate");
        assert_eq!(encode("gte.2025-03-05"), "gte.2025-03-05");
        assert_eq!(encode("100% & more"), "100%25+%26+more");
        assert_eq!(encode("Café"), "Caf%C3%A9");
    }

    #[test]
    fn decodes_plus_and_percent_spaces() {
        assert_eq!(decode("Computer+Society"), "Computer Society");
        assert_eq!(decode("Computer%20Society"), "Computer Society");
        assert_eq!(decode("Caf%C3%A9"), "Café");
        assert_eq!(decode("a%2Bb"), "a+b");
    }

    #[test]
    fn parses_pairs_in_order() {
        assert_eq!(
            parse("?ref=nav&&society=Photonics+Society&flag"),
            vec![
                ("ref".to_string(), "nav".to_string()),
                ("society".to_string(), "Photonics Society".to_string()),
                ("flag".to_string(), String::new()),
            ]
        );
        assert!(parse("").is_empty());
        assert!(parse("?").is_empty());
    }

    #[test]
    fn serializes_pairs() {
        let pairs = [("ref", "home"), ("society", "Women in Engineering")];
        assert_eq!(serialize(&pairs), "ref=home&society=Women+in+Engineering");
        assert_eq!(serialize::<&str, &str>(&[]), "");
    }
}
