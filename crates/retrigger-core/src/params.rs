//! `KEY=VALUE` parameter parsing

use crate::types::Params;

/// Parameter key injected when a forked build is requested
pub const FORK_PARAM: &str = "fork";

/// Parse `KEY=VALUE` tokens into a parameter map.
///
/// Best effort and never fails: a token must split into exactly two parts on
/// `=`, anything else is dropped. Later tokens overwrite earlier ones with the
/// same key. Values containing `=` are therefore dropped as well.
pub fn parse_pairs<I, S>(tokens: I) -> Params
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut params = Params::new();
    for token in tokens {
        let mut parts = token.as_ref().split('=');
        if let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) {
            params.insert(key.to_string(), value.to_string());
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs() {
        let p = parse_pairs(["FOO=bar/something:tag", "BAR=", "INVALID"]);
        assert_eq!(p.get("FOO").map(String::as_str), Some("bar/something:tag"));
        // Keys with empty values are valid
        assert_eq!(p.get("BAR").map(String::as_str), Some(""));
        assert!(!p.contains_key("INVALID"));
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn test_last_value_wins() {
        let p = parse_pairs(["A=1", "B=2", "A=3"]);
        assert_eq!(p.get("A").map(String::as_str), Some("3"));
        assert_eq!(p.get("B").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_value_with_equals_is_dropped() {
        let p = parse_pairs(["KEY=a=b", "OK=1"]);
        assert!(!p.contains_key("KEY"));
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn test_empty_key_is_kept() {
        let p = parse_pairs(["=value"]);
        assert_eq!(p.get("").map(String::as_str), Some("value"));
    }

    #[test]
    fn test_empty_input() {
        let p = parse_pairs(Vec::<String>::new());
        assert!(p.is_empty());
    }
}
