use crate::token::{Token, TokenType};

/// An ordered, randomly addressable token sequence with a cursor. Positions
/// are stable indices: rewinding to a saved position and advancing again
/// reproduces exactly the same tokens. Reads past the end keep yielding the
/// final `Eof` token.
pub struct TokenStream {
    tokens: Vec<Token>,
    position: usize,
    eof: Token,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        let eof = tokens
            .iter()
            .rfind(|t| t.type_ == TokenType::Eof)
            .cloned()
            .unwrap_or_else(|| Token::eof(1, 1));
        Self {
            tokens,
            position: 0,
            eof,
        }
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Random access by stable index.
    pub fn get(&self, index: usize) -> &Token {
        self.tokens.get(index).unwrap_or(&self.eof)
    }

    /// The token under the cursor.
    pub fn current(&self) -> &Token {
        self.get(self.position)
    }

    /// One-token lookahead.
    pub fn peek_next(&self) -> &Token {
        self.get(self.position + 1)
    }

    /// Consumes the current token and returns it.
    pub fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    /// Saves the cursor so a later `rewind` can re-drive the same tokens.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn rewind(&mut self, position: usize) {
        self.position = position;
    }
}
