//! Delimiter-aware scanning of object-literal text.
//!
//! Only enough of the JS/TS literal grammar is understood to recover
//! annotation values: quoted strings with escapes, arrays, nested objects and
//! bare tokens. Comments inside literals are skipped.

/// Parsed literal value
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Literal {
    /// Quoted string, escapes resolved
    Str(String),
    /// `[a, b]`
    List(Vec<Literal>),
    /// `{ key: value }`, keys unquoted
    Object(Vec<(String, Literal)>),
    /// Anything else, trimmed verbatim
    Bare(String),
}

impl Literal {
    pub(crate) fn parse(text: &str) -> Self {
        let text = text.trim();

        if let Some(inner) = strip_quotes(text) {
            return Self::Str(unescape(inner));
        }

        if let Some(inner) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
            let items = split_top_level(inner, ',')
                .into_iter()
                .map(Self::parse)
                .collect();
            return Self::List(items);
        }

        if text.starts_with('{') {
            if let Some(close) = find_matching_brace(text, 0) {
                if close == text.len() - 1 {
                    return Self::Object(parse_object_body(&text[1..close]));
                }
            }
        }

        Self::Bare(text.to_string())
    }

    /// Scalar rendering; lists join with ", "
    pub(crate) fn as_text(&self) -> String {
        match self {
            Self::Str(s) | Self::Bare(s) => s.clone(),
            Self::List(items) => items
                .iter()
                .map(Self::as_text)
                .collect::<Vec<_>>()
                .join(", "),
            Self::Object(pairs) => pairs
                .iter()
                .map(|(k, v)| format!("{k}: {}", v.as_text()))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// List rendering; scalars are treated as comma lists
    pub(crate) fn as_list(&self) -> Vec<String> {
        let raw: Vec<String> = match self {
            Self::List(items) => items.iter().map(Self::as_text).collect(),
            Self::Str(s) | Self::Bare(s) => split_top_level(s, ',')
                .into_iter()
                .map(|item| match strip_quotes(item) {
                    Some(inner) => unescape(inner),
                    None => item.to_string(),
                })
                .collect(),
            Self::Object(_) => vec![self.as_text()],
        };

        raw.into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    }
}

/// Parse `key: value, key2: value2` into pairs
pub(crate) fn parse_object_body(body: &str) -> Vec<(String, Literal)> {
    object_entries(body)
        .into_iter()
        .map(|(key, value)| (key, Literal::parse(value)))
        .collect()
}

/// `key: value` pairs with each value's source text left unparsed
pub(crate) fn object_entries(body: &str) -> Vec<(String, &str)> {
    split_top_level(body, ',')
        .into_iter()
        .filter_map(split_key_value)
        .collect()
}

/// Plain-text value: quotes stripped and escapes resolved, otherwise the
/// trimmed text as written
pub(crate) fn scalar_text(text: &str) -> String {
    let text = text.trim();
    match strip_quotes(text) {
        Some(inner) => unescape(inner),
        None => text.to_string(),
    }
}

/// Split `key: value` at the first top-level colon
pub(crate) fn split_key_value(piece: &str) -> Option<(String, &str)> {
    let colon = top_level_positions(piece, ':').into_iter().next()?;
    let key = piece[..colon].trim();
    let key = strip_quotes(key).unwrap_or(key);
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), piece[colon + 1..].trim()))
}

/// Byte index of the `}` matching the `{` at `open`, ignoring braces inside
/// strings and comments
pub(crate) fn find_matching_brace(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    let mut scanner = Scanner::new(text, open);
    while let Some((idx, ch)) = scanner.next_code_char() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on `sep` where it occurs outside brackets, braces, parens and strings
pub(crate) fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for pos in top_level_positions(text, sep) {
        pieces.push(text[start..pos].trim());
        start = pos + sep.len_utf8();
    }
    pieces.push(text[start..].trim());
    pieces.retain(|piece| !piece.is_empty());
    pieces
}

fn top_level_positions(text: &str, sep: char) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut depth = 0usize;
    let mut scanner = Scanner::new(text, 0);
    while let Some((idx, ch)) = scanner.next_code_char() {
        match ch {
            '{' | '[' | '(' => depth += 1,
            '}' | ']' | ')' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => positions.push(idx),
            _ => {}
        }
    }
    positions
}

/// Return the inside of a matching pair of quotes
pub(crate) fn strip_quotes(text: &str) -> Option<&str> {
    let mut chars = text.chars();
    let first = chars.next()?;
    if !matches!(first, '\'' | '"' | '`') || text.len() < 2 || !text.ends_with(first) {
        return None;
    }
    Some(&text[1..text.len() - 1])
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Walks characters, yielding only those outside string literals and comments
struct Scanner<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, start: usize) -> Self {
        let mut chars = text.char_indices().peekable();
        while chars.peek().is_some_and(|(idx, _)| *idx < start) {
            chars.next();
        }
        Self { chars }
    }

    fn next_code_char(&mut self) -> Option<(usize, char)> {
        loop {
            let (idx, ch) = self.chars.next()?;
            match ch {
                '\'' | '"' | '`' => self.skip_string(ch),
                '/' if self.chars.peek().is_some_and(|(_, c)| *c == '/') => self.skip_line(),
                '/' if self.chars.peek().is_some_and(|(_, c)| *c == '*') => self.skip_block(),
                _ => return Some((idx, ch)),
            }
        }
    }

    fn skip_string(&mut self, quote: char) {
        while let Some((_, ch)) = self.chars.next() {
            match ch {
                '\\' => {
                    self.chars.next();
                }
                c if c == quote => return,
                _ => {}
            }
        }
    }

    fn skip_line(&mut self) {
        for (_, ch) in self.chars.by_ref() {
            if ch == '\n' {
                return;
            }
        }
    }

    fn skip_block(&mut self) {
        self.chars.next();
        let mut prev = '\0';
        for (_, ch) in self.chars.by_ref() {
            if prev == '*' && ch == '/' {
                return;
            }
            prev = ch;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_matching_brace_ignores_quoted_braces() {
        let text = r#"{ desc: 'uses { and }', nested: { a: "}" } } tail"#;
        let close = find_matching_brace(text, 0).unwrap();
        assert_eq!(&text[close + 1..], " tail");
    }

    #[test]
    fn test_matching_brace_handles_escapes() {
        let text = r"{ desc: 'it\'s {' }";
        assert_eq!(find_matching_brace(text, 0), Some(text.len() - 1));
    }

    #[test]
    fn test_matching_brace_skips_comments() {
        let text = "{\n  // don't count }\n  id: 'a'\n}";
        assert_eq!(find_matching_brace(text, 0), Some(text.len() - 1));
    }

    #[test]
    fn test_unterminated_object() {
        assert_eq!(find_matching_brace("{ id: 'a', tags: ['x'", 0), None);
    }

    #[test]
    fn test_split_top_level_respects_nesting() {
        let pieces = split_top_level("a: 1, b: [1, 2], c: { d: 'x, y' },", ',');
        assert_eq!(pieces, vec!["a: 1", "b: [1, 2]", "c: { d: 'x, y' }"]);
    }

    #[test]
    fn test_parse_values() {
        assert_eq!(Literal::parse("'hi'"), Literal::Str("hi".into()));
        assert_eq!(Literal::parse(" 3 "), Literal::Bare("3".into()));
        assert_eq!(
            Literal::parse("['a', \"b\"]"),
            Literal::List(vec![Literal::Str("a".into()), Literal::Str("b".into())])
        );
        assert_eq!(
            Literal::parse("{ runtime: ['x'] }"),
            Literal::Object(vec![(
                "runtime".into(),
                Literal::List(vec![Literal::Str("x".into())])
            )])
        );
    }

    #[test]
    fn test_scalar_text_is_verbatim() {
        assert_eq!(scalar_text(" [beta] "), "[beta]");
        assert_eq!(scalar_text("{@link X}"), "{@link X}");
        assert_eq!(scalar_text("'it\\'s'"), "it's");
    }

    #[test]
    fn test_as_list_from_comma_text() {
        assert_eq!(
            Literal::parse("a, 'b', c ,").as_list(),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert_eq!(Literal::parse("[x, y]").as_list(), vec!["x", "y"]);
    }

    #[test]
    fn test_split_key_value_with_quoted_key() {
        let (key, value) = split_key_value("'desc': 'a: b'").unwrap();
        assert_eq!(key, "desc");
        assert_eq!(value, "'a: b'");
        assert!(split_key_value("no colon here").is_none());
    }
}
