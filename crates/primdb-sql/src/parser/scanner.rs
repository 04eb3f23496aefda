//! Low-level scanning over a command line.
//!
//! Keywords match case-insensitively on whole words; identifiers are
//! `[A-Za-z0-9_]+` and keep their case. Quoted substrings (`'...'` or
//! `"..."`) are opaque to the splitting helpers.

/// Returns true for characters allowed in identifiers.
pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Returns true if `s` is a non-empty identifier.
pub(crate) fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_ident_char)
}

/// A forward-only cursor over a line of input.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Returns the unconsumed input.
    pub(crate) fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub(crate) fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Returns true if only whitespace remains.
    pub(crate) fn is_at_end(&self) -> bool {
        self.rest().trim().is_empty()
    }

    /// Consumes `keyword` if it is the next whole word.
    pub(crate) fn eat_keyword(&mut self, keyword: &str) -> bool {
        self.skip_whitespace();
        let rest = self.rest();
        let len = keyword.len();

        let matches = rest.len() >= len
            && rest.is_char_boundary(len)
            && rest[..len].eq_ignore_ascii_case(keyword)
            && !rest[len..].starts_with(is_ident_char);

        if matches {
            self.pos += len;
        }
        matches
    }

    /// Consumes the next identifier.
    pub(crate) fn ident(&mut self) -> Option<&'a str> {
        self.skip_whitespace();
        let rest = self.rest();
        let len = rest.find(|c: char| !is_ident_char(c)).unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(&rest[..len])
    }

    /// Consumes `c` if it is the next non-whitespace character.
    pub(crate) fn eat_char(&mut self, c: char) -> bool {
        self.skip_whitespace();
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }
}

/// Splits `s` on `separator` wherever it is not inside quotes.
///
/// Parts are trimmed. An unterminated quote runs to the end of the input.
pub(crate) fn split_outside_quotes(s: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;

    for (i, c) in s.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c == separator => {
                parts.push(s[start..i].trim());
                start = i + c.len_utf8();
            }
            None => {}
        }
    }
    parts.push(s[start..].trim());
    parts
}

/// Finds the first whitespace-delimited occurrence of `keyword` outside
/// quotes. Returns the text before and after it, untrimmed.
pub(crate) fn split_at_keyword<'a>(s: &'a str, keyword: &str) -> Option<(&'a str, &'a str)> {
    let mut quote: Option<char> = None;
    let mut prev_is_space = false;

    for (i, c) in s.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None if c == '\'' || c == '"' => quote = Some(c),
            None if prev_is_space => {
                let rest = &s[i..];
                let len = keyword.len();
                let hit = rest.len() > len
                    && rest.is_char_boundary(len)
                    && rest[..len].eq_ignore_ascii_case(keyword)
                    && rest[len..].starts_with(char::is_whitespace);
                if hit {
                    return Some((&s[..i], &s[i + len..]));
                }
            }
            None => {}
        }
        prev_is_space = c.is_whitespace();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_whole_words() {
        let mut cursor = Cursor::new("  SELECT from users");
        assert!(cursor.eat_keyword("select"));
        assert!(cursor.eat_keyword("from"));
        assert_eq!(cursor.ident(), Some("users"));
        assert!(cursor.is_at_end());

        let mut cursor = Cursor::new("selection");
        assert!(!cursor.eat_keyword("select"));
        assert_eq!(cursor.ident(), Some("selection"));
    }

    #[test]
    fn test_ident_stops_at_punctuation() {
        let mut cursor = Cursor::new("name=\"Ann\"");
        assert_eq!(cursor.ident(), Some("name"));
        assert!(cursor.eat_char('='));
        assert_eq!(cursor.rest(), "\"Ann\"");
        assert_eq!(Cursor::new("=1").ident(), None);
    }

    #[test]
    fn test_split_respects_quotes() {
        assert_eq!(
            split_outside_quotes(r#""a, b", 1 , 'c,d',true"#, ','),
            vec![r#""a, b""#, "1", "'c,d'", "true"]
        );
        assert_eq!(split_outside_quotes("", ','), vec![""]);
        assert_eq!(split_outside_quotes("1,", ','), vec!["1", ""]);
    }

    #[test]
    fn test_split_at_keyword_skips_quoted_text() {
        let (set, filter) =
            split_at_keyword(r#"note="go where it is" WHERE ID=1"#, "where").unwrap();
        assert_eq!(set, r#"note="go where it is" "#);
        assert_eq!(filter, " ID=1");

        assert!(split_at_keyword("a=1", "where").is_none());
        assert!(split_at_keyword("nowhere=1 x", "where").is_none());
    }
}
