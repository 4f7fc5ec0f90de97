use std::borrow::Cow;
use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub(crate) enum Token<'a> {
    /// `{`
    Open,

    /// `}`
    Close,

    /// `[`
    ListOpen,

    /// `]`
    ListClose,

    /// `:`
    Colon,

    /// `,`
    Comma,

    /// Type names, field names, keywords and enum variants
    Ident(&'a str),

    /// A number without fraction or exponent
    Integer(&'a str),

    /// Any other number, including `-inf`
    Float(&'a str),

    /// Contents of a quoted string with escapes resolved
    Quoted(Cow<'a, str>),
}

impl<'a> fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Open => f.write_str("`{`"),
            Token::Close => f.write_str("`}`"),
            Token::ListOpen => f.write_str("`[`"),
            Token::ListClose => f.write_str("`]`"),
            Token::Colon => f.write_str("`:`"),
            Token::Comma => f.write_str("`,`"),
            Token::Ident(x) => write!(f, "identifier `{}`", x),
            Token::Integer(x) | Token::Float(x) => write!(f, "number `{}`", x),
            Token::Quoted(x) => write!(f, "string {:?}", x),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub(crate) enum LexErrorKind {
    UnterminatedString,
    InvalidEscape(char),
    InvalidNumber(String),
    UnexpectedChar(char),
}

#[derive(Debug, PartialEq, Clone)]
pub(crate) struct LexError {
    pub kind: LexErrorKind,
    pub line: usize,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LexErrorKind::UnterminatedString => f.write_str("unterminated string"),
            LexErrorKind::InvalidEscape(c) => write!(f, "invalid escape sequence: \\{}", c),
            LexErrorKind::InvalidNumber(x) => write!(f, "invalid number: {}", x),
            LexErrorKind::UnexpectedChar(c) => write!(f, "unexpected character: {:?}", c),
        }
    }
}

#[inline]
fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

#[inline]
fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Returns true if `name` lexes as a single identifier that the reader does
/// not treat as a literal
pub(crate) fn is_identifier(name: &str) -> bool {
    let bytes = name.as_bytes();
    match bytes.split_first() {
        Some((&first, rest)) if is_ident_start(first) => {
            rest.iter().all(|&b| is_ident(b)) && !matches!(name, "true" | "false" | "null")
        }
        _ => false,
    }
}

#[inline]
fn is_number(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'+' | b'-' | b'_')
}

#[inline]
fn is_number_start(b: u8, next: Option<u8>) -> bool {
    match b {
        b'0'..=b'9' => true,
        b'-' | b'+' => matches!(next, Some(c) if c.is_ascii_alphanumeric() || c == b'.'),
        b'.' => matches!(next, Some(c) if c.is_ascii_digit()),
        _ => false,
    }
}

/// Single pass tokenizer with one token of lookahead.
///
/// Whitespace and `#` comments are skipped. Lines are counted from 1.
#[derive(Debug)]
pub(crate) struct Lexer<'a> {
    data: &'a str,
    pos: usize,
    line: usize,
    token_line: usize,
    peeked: Option<(Token<'a>, usize)>,
}

impl<'a> Lexer<'a> {
    pub fn new(data: &'a str) -> Self {
        Lexer {
            data,
            pos: 0,
            line: 1,
            token_line: 1,
            peeked: None,
        }
    }

    /// The line of the most recently consumed token, or of the end of input
    /// once it has been reached
    pub fn line(&self) -> usize {
        self.token_line
    }

    /// Look at the next token without consuming it
    pub fn peek(&mut self) -> Result<Option<&Token<'a>>, LexError> {
        if self.peeked.is_none() {
            self.peeked = self.lex()?;
        }

        Ok(self.peeked.as_ref().map(|(token, _)| token))
    }

    /// Consume the next token
    pub fn next_token(&mut self) -> Result<Option<Token<'a>>, LexError> {
        let next = match self.peeked.take() {
            Some(x) => Some(x),
            None => self.lex()?,
        };

        match next {
            Some((token, line)) => {
                self.token_line = line;
                Ok(Some(token))
            }
            None => {
                self.token_line = self.line;
                Ok(None)
            }
        }
    }

    fn error(&self, kind: LexErrorKind) -> LexError {
        LexError {
            kind,
            line: self.line,
        }
    }

    fn skip_whitespace(&mut self) {
        let bytes = self.data.as_bytes();
        while let Some(&b) = bytes.get(self.pos) {
            match b {
                b'\n' => {
                    self.line += 1;
                    self.pos += 1;
                }
                b' ' | b'\t' | b'\r' => self.pos += 1,
                b'#' => {
                    while let Some(&c) = bytes.get(self.pos) {
                        if c == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    fn lex(&mut self) -> Result<Option<(Token<'a>, usize)>, LexError> {
        self.skip_whitespace();
        let data = self.data;
        let bytes = data.as_bytes();
        let start = self.pos;
        let line = self.line;
        let b = match bytes.get(start) {
            Some(&b) => b,
            None => return Ok(None),
        };

        let token = match b {
            b'{' => Token::Open,
            b'}' => Token::Close,
            b'[' => Token::ListOpen,
            b']' => Token::ListClose,
            b':' => Token::Colon,
            b',' => Token::Comma,
            b'"' => return self.lex_quoted().map(|x| Some((Token::Quoted(x), line))),
            b if is_number_start(b, bytes.get(start + 1).copied()) => {
                let end = scan(bytes, start + 1, is_number);
                self.pos = end;
                return classify_number(&data[start..end])
                    .map(|x| Some((x, line)))
                    .ok_or_else(|| {
                        self.error(LexErrorKind::InvalidNumber(String::from(&data[start..end])))
                    });
            }
            b if is_ident_start(b) => {
                let end = scan(bytes, start + 1, is_ident);
                self.pos = end;
                return Ok(Some((Token::Ident(&data[start..end]), line)));
            }
            _ => {
                let c = data[start..].chars().next().unwrap_or(char::REPLACEMENT_CHARACTER);
                return Err(self.error(LexErrorKind::UnexpectedChar(c)));
            }
        };

        self.pos += 1;
        Ok(Some((token, line)))
    }

    fn lex_quoted(&mut self) -> Result<Cow<'a, str>, LexError> {
        let data = self.data;
        let bytes = data.as_bytes();
        let start = self.pos + 1;
        let mut pos = start;

        // Fast path: no escapes means the contents can be borrowed
        while let Some(&b) = bytes.get(pos) {
            match b {
                b'"' => {
                    self.pos = pos + 1;
                    return Ok(Cow::Borrowed(&data[start..pos]));
                }
                b'\\' => break,
                b'\n' => {
                    self.line += 1;
                    pos += 1;
                }
                _ => pos += 1,
            }
        }

        let mut result = String::from(&data[start..pos]);
        loop {
            let c = match data[pos..].chars().next() {
                Some(c) => c,
                None => {
                    self.pos = pos;
                    return Err(self.error(LexErrorKind::UnterminatedString));
                }
            };
            pos += c.len_utf8();

            match c {
                '"' => break,
                '\\' => {
                    let escaped = match data[pos..].chars().next() {
                        Some(c) => c,
                        None => {
                            self.pos = pos;
                            return Err(self.error(LexErrorKind::UnterminatedString));
                        }
                    };
                    pos += escaped.len_utf8();
                    match escaped {
                        '"' => result.push('"'),
                        '\\' => result.push('\\'),
                        'n' => result.push('\n'),
                        't' => result.push('\t'),
                        'r' => result.push('\r'),
                        x => {
                            self.pos = pos;
                            return Err(self.error(LexErrorKind::InvalidEscape(x)));
                        }
                    }
                }
                '\n' => {
                    self.line += 1;
                    result.push(c);
                }
                c => result.push(c),
            }
        }

        self.pos = pos;
        Ok(Cow::Owned(result))
    }
}

#[inline]
fn scan(bytes: &[u8], mut pos: usize, f: impl Fn(u8) -> bool) -> usize {
    while matches!(bytes.get(pos), Some(&b) if f(b)) {
        pos += 1;
    }
    pos
}

fn classify_number(text: &str) -> Option<Token<'_>> {
    let digits = text.strip_prefix(|c: char| c == '-' || c == '+').unwrap_or(text);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        Some(Token::Integer(text))
    } else if text.parse::<f64>().is_ok() {
        Some(Token::Float(text))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    use rstest::rstest;

    fn tokens(data: &str) -> Vec<Token<'_>> {
        let mut lexer = Lexer::new(data);
        let mut result = Vec::new();
        while let Some(token) = lexer.next_token().unwrap() {
            result.push(token);
        }
        result
    }

    #[test]
    fn test_object_tokens() {
        assert_eq!(
            tokens(r#"Foo "bar" { a: 1, b: [Baz { }] }"#),
            vec![
                Token::Ident("Foo"),
                Token::Quoted(Cow::Borrowed("bar")),
                Token::Open,
                Token::Ident("a"),
                Token::Colon,
                Token::Integer("1"),
                Token::Comma,
                Token::Ident("b"),
                Token::Colon,
                Token::ListOpen,
                Token::Ident("Baz"),
                Token::Open,
                Token::Close,
                Token::ListClose,
                Token::Close,
            ]
        );
    }

    #[test]
    fn test_no_whitespace() {
        assert_eq!(
            tokens("a:-3"),
            vec![Token::Ident("a"), Token::Colon, Token::Integer("-3")]
        );
    }

    #[rstest]
    #[case("0", Token::Integer("0"))]
    #[case("-12", Token::Integer("-12"))]
    #[case("+7", Token::Integer("+7"))]
    #[case("1.5", Token::Float("1.5"))]
    #[case("-0.25", Token::Float("-0.25"))]
    #[case(".5", Token::Float(".5"))]
    #[case("1e-5", Token::Float("1e-5"))]
    #[case("3.0E8", Token::Float("3.0E8"))]
    #[case("-inf", Token::Float("-inf"))]
    fn test_numbers(#[case] input: &str, #[case] expected: Token) {
        assert_eq!(tokens(input), vec![expected]);
    }

    #[rstest]
    #[case("12abc")]
    #[case("1.2.3")]
    #[case("-x")]
    fn test_invalid_numbers(#[case] input: &str) {
        let mut lexer = Lexer::new(input);
        let err = lexer.next_token().unwrap_err();
        assert!(matches!(err.kind, LexErrorKind::InvalidNumber(_)));
    }

    #[test]
    fn test_comments_are_skipped() {
        let data = "# header\nFoo { # @1\n  a: 1 # trailing\n}\n";
        assert_eq!(
            tokens(data),
            vec![
                Token::Ident("Foo"),
                Token::Open,
                Token::Ident("a"),
                Token::Colon,
                Token::Integer("1"),
                Token::Close,
            ]
        );
    }

    #[test]
    fn test_escaped_quotes() {
        assert_eq!(
            tokens(r#""captain \"joe\" rogers\\ \n\t""#),
            vec![Token::Quoted(Cow::Owned(String::from(
                "captain \"joe\" rogers\\ \n\t"
            )))]
        );
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(tokens(r#""""#), vec![Token::Quoted(Cow::Borrowed(""))]);
    }

    #[test]
    fn test_unicode_string() {
        assert_eq!(
            tokens("\"héllo wörld\""),
            vec![Token::Quoted(Cow::Borrowed("héllo wörld"))]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new("\"abc\n");
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_invalid_escape() {
        let mut lexer = Lexer::new(r#""a\qb""#);
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::InvalidEscape('q'));
    }

    #[test]
    fn test_unexpected_char() {
        let mut lexer = Lexer::new("Foo = 1");
        assert_eq!(lexer.next_token().unwrap(), Some(Token::Ident("Foo")));
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnexpectedChar('='));
    }

    #[test]
    fn test_line_tracking() {
        let mut lexer = Lexer::new("a\n\n  b # c\n\"x\ny\" d");
        assert_eq!(lexer.next_token().unwrap(), Some(Token::Ident("a")));
        assert_eq!(lexer.line(), 1);
        assert_eq!(lexer.peek().unwrap(), Some(&Token::Ident("b")));
        assert_eq!(lexer.line(), 1);
        assert_eq!(lexer.next_token().unwrap(), Some(Token::Ident("b")));
        assert_eq!(lexer.line(), 3);
        assert!(matches!(lexer.next_token().unwrap(), Some(Token::Quoted(_))));
        assert_eq!(lexer.line(), 4);
        assert_eq!(lexer.next_token().unwrap(), Some(Token::Ident("d")));
        assert_eq!(lexer.line(), 5);
        assert_eq!(lexer.next_token().unwrap(), None);
        assert_eq!(lexer.line(), 5);
    }

    #[quickcheck]
    fn integers_lex_whole(x: i64) -> bool {
        let text = x.to_string();
        tokens(&text) == vec![Token::Integer(&text)]
    }

    #[rstest]
    #[case("linear", true)]
    #[case("_private2", true)]
    #[case("Light", true)]
    #[case("", false)]
    #[case("2d", false)]
    #[case("off-ish", false)]
    #[case("r#type", false)]
    #[case("true", false)]
    #[case("false", false)]
    #[case("null", false)]
    #[case("caf\u{e9}", false)]
    fn test_is_identifier(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_identifier(name), expected);
    }
}
