//! Identifier quoting.

/// How a dialect quotes table and column names.
///
/// Every identifier handed to [`KeywordWrap::wrap`] is quoted; there is no
/// reserved-word table. `*` and the empty string pass through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordWrap {
    /// No quoting.
    None,
    /// `"name"`, with embedded `"` doubled.
    DoubleQuote,
    /// `` `name` ``
    Backtick,
    /// `[name]`
    Bracket,
}

impl KeywordWrap {
    /// Quotes an identifier.
    #[must_use]
    pub fn wrap(self, ident: &str) -> String {
        if ident.is_empty() || ident == "*" {
            return String::from(ident);
        }
        match self {
            Self::None => String::from(ident),
            Self::DoubleQuote => format!("\"{}\"", ident.replace('"', "\"\"")),
            Self::Backtick => format!("`{ident}`"),
            Self::Bracket => format!("[{ident}]"),
        }
    }

    /// Returns the opening and closing quote characters, if any.
    #[must_use]
    pub const fn quotes(self) -> Option<(char, char)> {
        match self {
            Self::None => None,
            Self::DoubleQuote => Some(('"', '"')),
            Self::Backtick => Some(('`', '`')),
            Self::Bracket => Some(('[', ']')),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_policies() {
        assert_eq!(KeywordWrap::None.wrap("tb_account"), "tb_account");
        assert_eq!(KeywordWrap::DoubleQuote.wrap("tb_account"), "\"tb_account\"");
        assert_eq!(KeywordWrap::Backtick.wrap("tb_account"), "`tb_account`");
        assert_eq!(KeywordWrap::Bracket.wrap("tb_account"), "[tb_account]");
    }

    #[test]
    fn test_double_quote_escapes_embedded_quote() {
        assert_eq!(KeywordWrap::DoubleQuote.wrap("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_star_and_empty_pass_through() {
        assert_eq!(KeywordWrap::Bracket.wrap("*"), "*");
        assert_eq!(KeywordWrap::DoubleQuote.wrap(""), "");
    }

    #[test]
    fn test_keywords_are_wrapped_too() {
        assert_eq!(KeywordWrap::DoubleQuote.wrap("select"), "\"select\"");
    }
}
