use crate::token::{Token, TokenType};
use crate::trie::KeywordTrie;

/// Longest identifier length kept in the normalized lexeme; the raw text is
/// never truncated.
const IDENTIFIER_MAX_LENGTH: usize = 31;

pub struct Tokenizer {
    chars: Vec<char>,  // Source code.
    tokens: Vec<Token>,  // Tokens that have been tokenized from source code.
    start: usize,  // Points to the start of the current token.
    current: usize,  // Points to the *next* character to be scanned.
    line: usize,  // Keeps track of the current line number.
    column: usize,  // Column of the *next* character to be scanned.
    start_line: usize,  // Line the current token started on.
    start_column: usize,  // Column the current token started on.
    trie: KeywordTrie,  // Keyword classifier.
}

impl Tokenizer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
            trie: KeywordTrie::new(),
        }
    }

    /// Interface function. Scans the whole source in one pass. Lexical errors
    /// become `Invalid` tokens rather than failing the scan, so this always
    /// produces a full token sequence ending in `Eof`.
    pub fn tokenize(&mut self) -> Vec<Token> {
        while !self.is_at_end() {
            // Keep scanning until we reach the end of the file.
            self.start = self.current;
            self.start_line = self.line;
            self.start_column = self.column;
            self.scan_token();
        }

        self.tokens.push(Token::eof(self.line, self.column));
        std::mem::take(&mut self.tokens)
    }

    /// Attempts to build a token from the current character(s) in the source code.
    fn scan_token(&mut self) {
        let c = self.advance();

        match c {
            // Ignore whitespace; `advance` already tracked the line break.
            ' ' | '\t' | '\r' | '\n' => (),

            '/' if self.peek() == Some('/') => self.line_comment(),
            '/' if self.peek() == Some('*') => self.block_comment(),

            // Identifiers or keywords.
            'a'..='z' | 'A'..='Z' | '_' => self.word(),

            // Numbers. A leading `.` counts only when a digit follows.
            '0'..='9' => self.number(false),
            '.' if self.peek().map_or(false, |c| c.is_ascii_digit()) => self.number(true),

            '"' => self.string(),
            '\'' => self.char_literal(),

            // Operators and delimiters: two-character forms first.
            _ => self.operator(c),
        }
    }

    /// `//` to end of line. The newline itself is left for the next scan.
    fn line_comment(&mut self) {
        self.advance();  // Second `/`.
        while self.peek().map_or(false, |c| c != '\n') {
            self.advance();
        }
        let raw = self.raw_text();
        let lexeme: String = raw.chars().skip(2).collect();
        self.add_token(TokenType::Comment, lexeme);
    }

    /// `/* */`; the unterminated form consumes to end of input.
    fn block_comment(&mut self) {
        self.advance();  // `*`.
        let mut closed = false;
        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_next() == Some('/') {
                self.advance();
                self.advance();
                closed = true;
                break;
            }
            self.advance();
        }
        let raw = self.raw_text();
        let interior_end = if closed { raw.chars().count() - 2 } else { raw.chars().count() };
        let lexeme: String = raw.chars().take(interior_end).skip(2).collect();
        self.add_token(TokenType::Comment, lexeme);
    }

    /// Identifiers and keywords. Only a purely alphabetic run is offered to
    /// the trie; anything containing a digit or `_` is always an identifier.
    fn word(&mut self) {
        while self.peek().map_or(false, |c| c.is_ascii_alphanumeric() || c == '_') {
            self.advance();
        }

        let raw = self.raw_text();
        let all_letters = raw.chars().all(|c| c.is_ascii_alphabetic());
        let type_ = if all_letters {
            self.trie.classify(&raw).unwrap_or(TokenType::Identifier)
        } else {
            TokenType::Identifier
        };

        let mut lexeme = raw.to_ascii_lowercase();
        if type_ == TokenType::Identifier && lexeme.chars().count() > IDENTIFIER_MAX_LENGTH {
            lexeme.truncate(IDENTIFIER_MAX_LENGTH);
        }
        self.add_token(type_, lexeme);
    }

    /// Numbers: digits, optional single `.` fraction, optional exponent with
    /// optional sign. `started_with_dot` covers the `.5` form.
    fn number(&mut self, started_with_dot: bool) {
        while self.peek().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        if !started_with_dot
            && self.peek() == Some('.')
            && self.peek_next().map_or(false, |c| c.is_ascii_digit())
        {
            self.advance();  // The `.`.
            while self.peek().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        // Exponent, consumed only when well formed so the lexeme always
        // parses as a number.
        if self.peek() == Some('e') || self.peek() == Some('E') {
            let after_e = self.peek_next();
            let exponent_ok = match after_e {
                Some(c) if c.is_ascii_digit() => true,
                Some('+') | Some('-') => {
                    self.peek_at(2).map_or(false, |c| c.is_ascii_digit())
                },
                _ => false,
            };
            if exponent_ok {
                self.advance();  // `e` / `E`.
                if matches!(self.peek(), Some('+') | Some('-')) {
                    self.advance();
                }
                while self.peek().map_or(false, |c| c.is_ascii_digit()) {
                    self.advance();
                }
            }
        }

        let raw = self.raw_text();
        self.add_token(TokenType::Number, raw);
    }

    /// Double-quoted strings. `\n`, `\t` and `\r` expand; any other escaped
    /// character passes through literally. A string that reaches the end of
    /// the line without a closing quote is accepted and closes there.
    fn string(&mut self) {
        let mut value = String::new();
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;  // Implicitly closed at end of line.
            }
            if c == '"' {
                self.advance();
                break;
            }
            if c == '\\' {
                self.advance();
                if let Some(next) = self.peek() {
                    self.advance();
                    value.push(unescape_char(next));
                }
            } else {
                value.push(c);
                self.advance();
            }
        }
        self.add_token(TokenType::StringLiteral, value);
    }

    /// Single-quoted character literal: exactly one value character, with the
    /// same escape rules as strings. A missing closing quote is tolerated.
    fn char_literal(&mut self) {
        let mut value = '\0';
        if let Some(c) = self.peek() {
            if c == '\\' {
                self.advance();
                if let Some(next) = self.peek() {
                    self.advance();
                    value = unescape_char(next);
                }
            } else {
                value = c;
                self.advance();
            }
        }
        if self.peek() == Some('\'') {
            self.advance();
        }
        self.add_token(TokenType::CharLiteral, value.to_string());
    }

    /// Operators and delimiters. Two-character forms must be checked before
    /// their single-character prefixes; anything unrecognized becomes an
    /// `Invalid` token rather than being dropped.
    fn operator(&mut self, c: char) {
        let two_char = match (c, self.peek()) {
            ('+', Some('=')) => Some(TokenType::PlusEqual),
            ('-', Some('=')) => Some(TokenType::MinusEqual),
            ('*', Some('=')) => Some(TokenType::StarEqual),
            ('/', Some('=')) => Some(TokenType::SlashEqual),
            ('%', Some('=')) => Some(TokenType::PercentEqual),
            ('+', Some('+')) => Some(TokenType::PlusPlus),
            ('-', Some('-')) => Some(TokenType::MinusMinus),
            ('=', Some('=')) => Some(TokenType::EqualEqual),
            ('!', Some('=')) => Some(TokenType::NotEqual),
            ('>', Some('=')) => Some(TokenType::GreaterEqual),
            ('<', Some('=')) => Some(TokenType::LessEqual),
            ('&', Some('&')) => Some(TokenType::AndAnd),
            ('|', Some('|')) => Some(TokenType::OrOr),
            _ => None,
        };

        let type_ = if let Some(type_) = two_char {
            self.advance();
            type_
        } else {
            match c {
                '+' => TokenType::Plus,
                '-' => TokenType::Minus,
                '*' => TokenType::Star,
                '/' => TokenType::Slash,
                '%' => TokenType::Percent,
                '=' => TokenType::Equal,
                '>' => TokenType::Greater,
                '<' => TokenType::Less,
                '!' => TokenType::Not,
                '&' => TokenType::BitAnd,
                '|' => TokenType::BitOr,
                '^' => TokenType::BitXor,
                '~' => TokenType::Tilde,
                '(' => TokenType::LeftParen,
                ')' => TokenType::RightParen,
                '{' => TokenType::LeftBrace,
                '}' => TokenType::RightBrace,
                '[' => TokenType::LeftBracket,
                ']' => TokenType::RightBracket,
                ';' => TokenType::Semicolon,
                ',' => TokenType::Comma,
                '.' => TokenType::Dot,
                ':' => TokenType::Colon,
                '?' => TokenType::Question,
                _ => TokenType::Invalid,
            }
        };

        let raw = self.raw_text();
        self.add_token(type_, raw);
    }

    /// Consumes and returns the next character, tracking line and column.
    fn advance(&mut self) -> char {
        let c = self.chars[self.current];
        self.current += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    /// Returns the next character if there is one.
    fn peek(&self) -> Option<char> {
        self.chars.get(self.current).copied()
    }

    /// Returns the character after next if there is one.
    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.current + 1).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.current + offset).copied()
    }

    /// Helper function for better readability. Returns whether `current` is out of range (we have reached the end).
    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }

    /// The original text of the token being scanned.
    fn raw_text(&self) -> String {
        self.chars[self.start..self.current].iter().collect()
    }

    fn add_token(&mut self, type_: TokenType, lexeme: String) {
        self.tokens.push(Token {
            type_,
            lexeme,
            raw: self.raw_text(),
            line: self.start_line,
            column: self.start_column,
        });
    }
}

fn unescape_char(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use crate::token::{Token, TokenType};

    use super::Tokenizer;

    fn tokenize(source: &str) -> Vec<Token> {
        let mut tokenizer = Tokenizer::new(source);
        tokenizer.tokenize()
    }

    fn types(source: &str) -> Vec<TokenType> {
        tokenize(source).iter().map(|t| t.type_).collect()
    }

    #[test]
    fn keywords_fold_case_but_keep_raw() {
        let tokens = tokenize("WHILE While let");
        assert_eq!(tokens[0].type_, TokenType::While);
        assert_eq!(tokens[0].lexeme, "while");
        assert_eq!(tokens[0].raw, "WHILE");
        assert_eq!(tokens[1].type_, TokenType::While);
        assert_eq!(tokens[1].raw, "While");
        assert_eq!(tokens[2].type_, TokenType::Let);
    }

    #[test]
    fn words_with_digits_or_underscores_are_identifiers() {
        // "while1" and "_while" must never classify as keywords.
        assert_eq!(
            types("while1 _while whiles"),
            vec![
                TokenType::Identifier,
                TokenType::Identifier,
                TokenType::Identifier,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn long_identifier_truncates_lexeme_only() {
        let name = "abcdefghijklmnopqrstuvwxyzabcdefghij";  // 36 characters.
        let tokens = tokenize(name);
        assert_eq!(tokens[0].type_, TokenType::Identifier);
        assert_eq!(tokens[0].lexeme.len(), 31);
        assert_eq!(tokens[0].raw, name);
    }

    #[test]
    fn two_char_operators_before_one_char() {
        assert_eq!(
            types("+= ++ == != >= <= && || + = > ! & |"),
            vec![
                TokenType::PlusEqual,
                TokenType::PlusPlus,
                TokenType::EqualEqual,
                TokenType::NotEqual,
                TokenType::GreaterEqual,
                TokenType::LessEqual,
                TokenType::AndAnd,
                TokenType::OrOr,
                TokenType::Plus,
                TokenType::Equal,
                TokenType::Greater,
                TokenType::Not,
                TokenType::BitAnd,
                TokenType::BitOr,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn numbers() {
        let tokens = tokenize("42 3.25 .5 1e3 2.5E-2 7.");
        assert_eq!(tokens[0].lexeme, "42");
        assert_eq!(tokens[1].lexeme, "3.25");
        assert_eq!(tokens[2].lexeme, ".5");
        assert_eq!(tokens[3].lexeme, "1e3");
        assert_eq!(tokens[4].lexeme, "2.5E-2");
        // A trailing `.` is not part of the number.
        assert_eq!(tokens[5].lexeme, "7");
        assert_eq!(tokens[6].type_, TokenType::Dot);
    }

    #[test]
    fn string_escapes_expand_in_lexeme_only() {
        let tokens = tokenize("\"a\\tb\\n\\\"c\"");
        assert_eq!(tokens[0].type_, TokenType::StringLiteral);
        assert_eq!(tokens[0].lexeme, "a\tb\n\"c");
        assert_eq!(tokens[0].raw, "\"a\\tb\\n\\\"c\"");
    }

    #[test]
    fn unterminated_string_closes_at_end_of_line() {
        let tokens = tokenize("\"abc\nx");
        assert_eq!(tokens[0].type_, TokenType::StringLiteral);
        assert_eq!(tokens[0].lexeme, "abc");
        // Scanning continues on the next line.
        assert_eq!(tokens[1].type_, TokenType::Identifier);
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn char_literals() {
        let tokens = tokenize("'a' '\\n' 'b");
        assert_eq!(tokens[0].type_, TokenType::CharLiteral);
        assert_eq!(tokens[0].lexeme, "a");
        assert_eq!(tokens[1].lexeme, "\n");
        // Missing closing quote is tolerated.
        assert_eq!(tokens[2].type_, TokenType::CharLiteral);
        assert_eq!(tokens[2].lexeme, "b");
    }

    #[test]
    fn comments_become_comment_tokens() {
        let tokens = tokenize("// note\n/* a\nb */ /* open");
        assert_eq!(tokens[0].type_, TokenType::Comment);
        assert_eq!(tokens[0].lexeme, " note");
        assert_eq!(tokens[1].type_, TokenType::Comment);
        assert_eq!(tokens[1].lexeme, " a\nb ");
        // The unterminated form consumes to end of input.
        assert_eq!(tokens[2].type_, TokenType::Comment);
        assert_eq!(tokens[2].lexeme, " open");
        assert_eq!(tokens[3].type_, TokenType::Eof);
    }

    #[test]
    fn invalid_characters_are_tokens() {
        let tokens = tokenize("@ let");
        assert_eq!(tokens[0].type_, TokenType::Invalid);
        assert_eq!(tokens[0].raw, "@");
        assert_eq!(tokens[1].type_, TokenType::Let);
    }

    #[test]
    fn line_and_column_tracking() {
        let tokens = tokenize("let x\n  = 1");
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (1, 5));
        assert_eq!((tokens[2].line, tokens[2].column), (2, 3));
        assert_eq!((tokens[3].line, tokens[3].column), (2, 5));
    }
}
