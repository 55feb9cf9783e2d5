//! Percent-encoding of path, query and fragment components.

use std::borrow::Cow;

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Which component is being encoded; query and fragment also allow `?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Component {
    Path,
    QueryOrFragment,
}

/// Percent-encodes a path, keeping unreserved, sub-delims, `:`, `@`, `/` and
/// existing `%XX` triplets.
pub fn encode_path(input: &str) -> Cow<'_, str> {
    encode(input, Component::Path)
}

/// Percent-encodes a query or a fragment. Same set as [`encode_path`] plus `?`.
pub fn encode_query_or_fragment(input: &str) -> Cow<'_, str> {
    encode(input, Component::QueryOrFragment)
}

#[inline]
fn is_allowed(byte: u8, component: Component) -> bool {
    match byte {
        b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'-' | b'.' | b'~' => true,
        b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'=' => true,
        b':' | b'@' | b'/' => true,
        b'?' => component == Component::QueryOrFragment,
        _ => false,
    }
}

#[inline]
fn is_triplet(bytes: &[u8], index: usize) -> bool {
    bytes.len() > index + 2 && bytes[index + 1].is_ascii_hexdigit() && bytes[index + 2].is_ascii_hexdigit()
}

fn encode(input: &str, component: Component) -> Cow<'_, str> {
    let bytes = input.as_bytes();

    let first = bytes
        .iter()
        .enumerate()
        .position(|(i, &b)| if b == b'%' { !is_triplet(bytes, i) } else { !is_allowed(b, component) });

    let Some(first) = first else {
        return Cow::Borrowed(input);
    };

    let mut out = String::with_capacity(input.len() + 8);
    out.push_str(&input[..first]);

    for (i, &b) in bytes.iter().enumerate().skip(first) {
        if (b == b'%' && is_triplet(bytes, i)) || (b != b'%' && is_allowed(b, component)) {
            out.push(char::from(b));
        } else {
            out.push('%');
            out.push(char::from(HEX[usize::from(b >> 4)]));
            out.push(char::from(HEX[usize::from(b & 0x0f)]));
        }
    }

    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path_is_borrowed() {
        let encoded = encode_path("/users/42/profile");
        assert!(matches!(encoded, Cow::Borrowed(_)));
        assert_eq!(encoded, "/users/42/profile");
    }

    #[test]
    fn test_encode_space_and_unicode() {
        assert_eq!(encode_path("/a b"), "/a%20b");
        assert_eq!(encode_path("/caf\u{e9}"), "/caf%C3%A9");
    }

    #[test]
    fn test_question_mark() {
        assert_eq!(encode_path("/what?"), "/what%3F");
        assert_eq!(encode_query_or_fragment("a=1?b"), "a=1?b");
    }

    #[test]
    fn test_triplets_pass_through() {
        assert_eq!(encode_path("/a%20b"), "/a%20b");
        assert_eq!(encode_path("/a%2fb"), "/a%2fb");
        assert_eq!(encode_query_or_fragment("q=%E2%9C%93"), "q=%E2%9C%93");
    }

    #[test]
    fn test_lone_percent() {
        assert_eq!(encode_path("/100%"), "/100%25");
        assert_eq!(encode_path("/%zz"), "/%25zz");
        assert_eq!(encode_query_or_fragment("p=%4"), "p=%254");
    }

    #[test]
    fn test_idempotent() {
        let samples = ["/a b/%/c%20d", "x=\u{1f600}&y=[1]", "%%%41", "#frag ment", "caf\u{e9}%C3%A9"];

        for sample in samples {
            let once = encode_query_or_fragment(sample).into_owned();
            let twice = encode_query_or_fragment(&once).into_owned();
            assert_eq!(once, twice, "sample {sample:?}");

            let once = encode_path(sample).into_owned();
            let twice = encode_path(&once).into_owned();
            assert_eq!(once, twice, "sample {sample:?}");
        }
    }
}
