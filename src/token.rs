/// Every lexical unit the scanner can produce. Keywords get their own
/// variant so that statement dispatch is a plain `match` instead of repeated
/// lexeme comparisons; `category_name` maps each word back to the coarse
/// category the symbol-table format records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenType {
    // Contextual keywords.
    And, Args, Async, Dyn, Global, Input, Let, Nmof, Nnull, Or,
    Print, Rec, Stc, Str, This, Val, Var,

    // Reserved words.
    Base, Const, Else, For, Foreach, If, Iface, In, New, Nspace,
    Null, Rdo, Return, Use, While,

    // Control-flow and structure words with dedicated tokens.
    Switch, Case, Default, Break, Next, Do,
    Class, Struct, Enum, Record,
    Pub, Priv, Prot, Req,
    Get, Set, Init,
    As,

    // Type names (bool, char, double, int, void). The grammar treats them
    // uniformly, so one token type covers all five; the lexeme says which.
    Type,

    // Boolean literals.
    True, False,

    // Noise words (at, its, then): optional readability fillers.
    NoiseWord,

    Identifier,

    // Literals.
    Number, StringLiteral, CharLiteral,

    // Arithmetic operators.
    Plus, Minus, Star, Slash, Percent,
    PlusPlus, MinusMinus,

    // Assignment.
    Equal, PlusEqual, MinusEqual, StarEqual, SlashEqual, PercentEqual,

    // Comparison operators.
    EqualEqual, NotEqual, Greater, Less, GreaterEqual, LessEqual,

    // Logical operators.
    AndAnd, OrOr, Not,

    // Bitwise operators: tokenized only, never parsed into expressions.
    BitAnd, BitOr, BitXor, Tilde,

    // Delimiters.
    LeftParen, RightParen,
    LeftBrace, RightBrace,
    LeftBracket, RightBracket,
    Semicolon, Comma, Dot, Colon, Question,

    Comment,
    Invalid,
    Eof,
}

impl TokenType {
    /// The TYPE column of the symbol-table format. Contextual keywords all
    /// collapse to `KEYWORD`, reserved words to `RESERVED_WORD`, and so on;
    /// the lexeme column disambiguates on read-back.
    pub fn category_name(&self) -> &'static str {
        match self {
            Self::And | Self::Args | Self::Async | Self::Dyn | Self::Global
            | Self::Input | Self::Let | Self::Nmof | Self::Nnull | Self::Or
            | Self::Print | Self::Rec | Self::Stc | Self::Str | Self::This
            | Self::Val | Self::Var => "KEYWORD",

            Self::Base | Self::Const | Self::Else | Self::For | Self::Foreach
            | Self::If | Self::Iface | Self::In | Self::New | Self::Nspace
            | Self::Null | Self::Rdo | Self::Return | Self::Use
            | Self::While => "RESERVED_WORD",

            Self::Switch => "SWITCH",
            Self::Case => "CASE",
            Self::Default => "DEFAULT",
            Self::Break => "BREAK",
            Self::Next => "NEXT",
            Self::Do => "DO",
            Self::Class => "CLASS",
            Self::Struct => "STRUCT",
            Self::Enum => "ENUM",
            Self::Record => "RECORD",
            Self::Pub => "PUB",
            Self::Priv => "PRIV",
            Self::Prot => "PROT",
            Self::Req => "REQ",
            Self::Get => "GET",
            Self::Set => "SET",
            Self::Init => "INIT",
            Self::As => "AS",

            Self::Type => "TYPE",
            Self::True | Self::False => "BOOLEAN_LITERAL",
            Self::NoiseWord => "NOISE_WORD",
            Self::Identifier => "IDENTIFIER",

            Self::Number => "NUMBER",
            Self::StringLiteral => "STRING_LITERAL",
            Self::CharLiteral => "CHAR_LITERAL",

            Self::Plus => "PLUS",
            Self::Minus => "MINUS",
            Self::Star => "STAR",
            Self::Slash => "SLASH",
            Self::Percent => "PERCENT",
            Self::PlusPlus => "PLUS_PLUS",
            Self::MinusMinus => "MINUS_MINUS",

            Self::Equal => "EQUAL",
            Self::PlusEqual => "PLUS_EQUAL",
            Self::MinusEqual => "MINUS_EQUAL",
            Self::StarEqual => "STAR_EQUAL",
            Self::SlashEqual => "SLASH_EQUAL",
            Self::PercentEqual => "PERCENT_EQUAL",

            Self::EqualEqual => "EQUAL_EQUAL",
            Self::NotEqual => "NOT_EQUAL",
            Self::Greater => "GREATER",
            Self::Less => "LESS",
            Self::GreaterEqual => "GREATER_EQUAL",
            Self::LessEqual => "LESS_EQUAL",

            Self::AndAnd => "AND_AND",
            Self::OrOr => "OR_OR",
            Self::Not => "NOT",

            Self::BitAnd => "AND",
            Self::BitOr => "OR",
            Self::BitXor => "XOR",
            Self::Tilde => "TILDE",

            Self::LeftParen => "LEFT_PAREN",
            Self::RightParen => "RIGHT_PAREN",
            Self::LeftBrace => "LEFT_BRACE",
            Self::RightBrace => "RIGHT_BRACE",
            Self::LeftBracket => "LEFT_BRACKET",
            Self::RightBracket => "RIGHT_BRACKET",
            Self::Semicolon => "SEMICOLON",
            Self::Comma => "COMMA",
            Self::Dot => "DOT",
            Self::Colon => "COLON",
            Self::Question => "QUESTION",

            Self::Comment => "COMMENT",
            Self::Invalid => "INVALID",
            Self::Eof => "EOF",
        }
    }

    /// Whether a token of this type can open a statement. Panic-mode
    /// recovery stops skipping when it reaches one of these.
    pub fn begins_statement(&self) -> bool {
        matches!(self.category_name(), "KEYWORD" | "RESERVED_WORD" | "TYPE")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub type_: TokenType,  // Type of token.
    pub lexeme: String,  // Normalized text: lowercase for words, unescaped for literals.
    pub raw: String,  // The original text exactly as written in the source.
    pub line: usize,  // The line the token started on (1-based).
    pub column: usize,  // The column the token started on (1-based).
}

impl Token {
    pub fn eof(line: usize, column: usize) -> Self {
        Self {
            type_: TokenType::Eof,
            lexeme: String::new(),
            raw: String::new(),
            line,
            column,
        }
    }
}
