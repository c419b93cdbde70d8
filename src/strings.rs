//! String helpers shared by the emitters.

/// Escape every double quote in `s` so it can sit inside a quoted atom.
pub fn dequote(s: &str) -> String {
    s.replace('"', "\\\"")
}

/// `s` without `prefix` if it starts with it, `s` unchanged otherwise.
pub fn remove_prefix<'a>(s: &'a str, prefix: &str) -> &'a str {
    s.strip_prefix(prefix).unwrap_or(s)
}

/// Full escape for emission: backslashes first, then quotes.
pub(crate) fn escape(s: &str) -> String {
    dequote(&s.replace('\\', "\\\\"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("plain", "plain")]
    #[case(r#"say "hi""#, r#"say \"hi\""#)]
    #[case(r#""""#, r#"\"\""#)]
    fn dequote_escapes_quotes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(dequote(input), expected);
    }

    #[test]
    fn dequote_is_idempotent_without_raw_quotes() {
        let s = "Net-(R1-Pad1) \\ path";
        assert_eq!(dequote(&dequote(s)), dequote(s));
    }

    #[rstest]
    #[case("Device:R", "Device:", "R")]
    #[case("R_1_1", "R_", "1_1")]
    #[case("R_1_1", "C_", "R_1_1")]
    #[case("", "x", "")]
    fn remove_prefix_only_strips_a_match(
        #[case] s: &str,
        #[case] prefix: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(remove_prefix(s, prefix), expected);
    }

    #[test]
    fn escape_doubles_backslashes() {
        assert_eq!(escape(r#"a\"b"#), r#"a\\\"b"#);
    }
}
