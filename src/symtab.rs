use std::io::{self, Write};

use crate::token::{Token, TokenType};
use crate::trie::KeywordTrie;

/// The legacy pipe-delimited token hand-off format: a fixed header, one
/// `LINE | COL | TYPE | LEXEME | RAW` row per token (comments included), and
/// a `Total tokens:` / `END OF SYMBOL TABLE` footer. Line breaks and tabs
/// inside lexemes are escaped on write and re-expanded on read.

pub fn write_symbol_table<W: Write>(tokens: &[Token], out: &mut W) -> io::Result<()> {
    writeln!(out, "CYTHONIC LEXICAL ANALYZER - SYMBOL TABLE")?;
    writeln!(out, "========================================")?;
    writeln!(out)?;
    writeln!(out, "LINE | COL | TYPE              | LEXEME                        | RAW")?;
    writeln!(out, "-----|-----|-------------------|-------------------------------|----------------------------------")?;

    let mut count = 0;
    for token in tokens {
        if token.type_ == TokenType::Eof {
            break;
        }
        writeln!(
            out,
            "{:>4} | {:>3} | {:<17} | {:<29} | {}",
            token.line,
            token.column,
            token.type_.category_name(),
            escape(&token.lexeme),
            escape(&token.raw),
        )?;
        count += 1;
    }

    writeln!(out)?;
    writeln!(out, "Total tokens: {}", count)?;
    writeln!(out, "END OF SYMBOL TABLE")?;
    Ok(())
}

/// Reads tokens back from symbol-table text. Rows typed COMMENT are dropped;
/// everything else reconstructs with identical category, texts and position.
pub fn read_symbol_table(input: &str) -> Vec<Token> {
    let trie = KeywordTrie::new();
    let mut tokens = Vec::new();
    let mut in_rows = false;

    for line in input.lines() {
        if !in_rows {
            // Everything up to and including the dashed separator is header.
            if line.starts_with("-----") {
                in_rows = true;
            }
            continue;
        }
        if line.starts_with("Total tokens:") || line.starts_with("END OF SYMBOL TABLE") {
            break;
        }

        let mut fields = line.splitn(5, '|');
        let (Some(line_str), Some(col_str), Some(type_str), Some(lexeme_str), Some(raw_str)) = (
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
        ) else {
            continue;
        };

        let type_str = type_str.trim();
        if type_str == "COMMENT" {
            continue;
        }

        let lexeme = unescape(lexeme_str.trim());
        let raw = unescape(raw_str.trim());
        tokens.push(Token {
            type_: type_from_row(type_str, &lexeme, &trie),
            lexeme,
            raw,
            line: line_str.trim().parse().unwrap_or(0),
            column: col_str.trim().parse().unwrap_or(0),
        });
    }

    tokens
}

/// Maps a TYPE column entry back to a token type. Word categories share one
/// category name, so the lexeme re-classifies through the keyword trie.
fn type_from_row(type_str: &str, lexeme: &str, trie: &KeywordTrie) -> TokenType {
    match type_str {
        "KEYWORD" | "RESERVED_WORD" | "TYPE" | "BOOLEAN_LITERAL" | "NOISE_WORD" => {
            trie.classify(lexeme).unwrap_or(TokenType::Invalid)
        },
        "IDENTIFIER" => TokenType::Identifier,
        "SWITCH" => TokenType::Switch,
        "CASE" => TokenType::Case,
        "DEFAULT" => TokenType::Default,
        "BREAK" => TokenType::Break,
        "NEXT" => TokenType::Next,
        "DO" => TokenType::Do,
        "CLASS" => TokenType::Class,
        "STRUCT" => TokenType::Struct,
        "ENUM" => TokenType::Enum,
        "RECORD" => TokenType::Record,
        "PUB" => TokenType::Pub,
        "PRIV" => TokenType::Priv,
        "PROT" => TokenType::Prot,
        "REQ" => TokenType::Req,
        "GET" => TokenType::Get,
        "SET" => TokenType::Set,
        "INIT" => TokenType::Init,
        "AS" => TokenType::As,
        "NUMBER" => TokenType::Number,
        "STRING_LITERAL" => TokenType::StringLiteral,
        "CHAR_LITERAL" => TokenType::CharLiteral,
        "PLUS" => TokenType::Plus,
        "MINUS" => TokenType::Minus,
        "STAR" => TokenType::Star,
        "SLASH" => TokenType::Slash,
        "PERCENT" => TokenType::Percent,
        "PLUS_PLUS" => TokenType::PlusPlus,
        "MINUS_MINUS" => TokenType::MinusMinus,
        "EQUAL" => TokenType::Equal,
        "PLUS_EQUAL" => TokenType::PlusEqual,
        "MINUS_EQUAL" => TokenType::MinusEqual,
        "STAR_EQUAL" => TokenType::StarEqual,
        "SLASH_EQUAL" => TokenType::SlashEqual,
        "PERCENT_EQUAL" => TokenType::PercentEqual,
        "EQUAL_EQUAL" => TokenType::EqualEqual,
        "NOT_EQUAL" => TokenType::NotEqual,
        "GREATER" => TokenType::Greater,
        "LESS" => TokenType::Less,
        "GREATER_EQUAL" => TokenType::GreaterEqual,
        "LESS_EQUAL" => TokenType::LessEqual,
        "AND_AND" => TokenType::AndAnd,
        "OR_OR" => TokenType::OrOr,
        "NOT" => TokenType::Not,
        "AND" => TokenType::BitAnd,
        "OR" => TokenType::BitOr,
        "XOR" => TokenType::BitXor,
        "TILDE" => TokenType::Tilde,
        "LEFT_PAREN" => TokenType::LeftParen,
        "RIGHT_PAREN" => TokenType::RightParen,
        "LEFT_BRACE" => TokenType::LeftBrace,
        "RIGHT_BRACE" => TokenType::RightBrace,
        "LEFT_BRACKET" => TokenType::LeftBracket,
        "RIGHT_BRACKET" => TokenType::RightBracket,
        "SEMICOLON" => TokenType::Semicolon,
        "COMMA" => TokenType::Comma,
        "DOT" => TokenType::Dot,
        "COLON" => TokenType::Colon,
        "QUESTION" => TokenType::Question,
        "EOF" => TokenType::Eof,
        _ => TokenType::Invalid,
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::token::TokenType;
    use crate::tokenizer::Tokenizer;

    use super::{read_symbol_table, write_symbol_table};

    fn round_trip(source: &str) -> (Vec<crate::token::Token>, Vec<crate::token::Token>) {
        let tokens = Tokenizer::new(source).tokenize();
        let mut text = Vec::new();
        write_symbol_table(&tokens, &mut text).unwrap();
        let read_back = read_symbol_table(&String::from_utf8(text).unwrap());
        (tokens, read_back)
    }

    #[test]
    fn round_trip_preserves_non_comment_tokens() {
        let source = "let count = 3;\nwhile (count > 0) { print(count); count = count - 1; }";
        let (original, read_back) = round_trip(source);
        let expected: Vec<_> = original
            .into_iter()
            .filter(|t| t.type_ != TokenType::Comment && t.type_ != TokenType::Eof)
            .collect();
        assert_eq!(expected, read_back);
    }

    #[test]
    fn comment_rows_are_dropped_on_read() {
        let source = "// leading note\nlet x = 1; /* inline */ print(x);";
        let (original, read_back) = round_trip(source);
        assert!(original.iter().any(|t| t.type_ == TokenType::Comment));
        assert!(read_back.iter().all(|t| t.type_ != TokenType::Comment));
        // Everything else survives in order.
        assert_eq!(read_back[0].type_, TokenType::Let);
        assert_eq!(read_back[0].line, 2);
    }

    #[test]
    fn escapes_re_expand_on_read() {
        let source = "\"a\\tb\\nc\"";
        let (original, read_back) = round_trip(source);
        assert_eq!(original[0].lexeme, "a\tb\nc");
        assert_eq!(read_back[0].lexeme, "a\tb\nc");
        assert_eq!(read_back[0].raw, original[0].raw);
    }

    #[test]
    fn footer_reports_token_count() {
        let tokens = Tokenizer::new("let x = 1;").tokenize();
        let mut text = Vec::new();
        write_symbol_table(&tokens, &mut text).unwrap();
        let text = String::from_utf8(text).unwrap();
        assert!(text.contains("Total tokens: 5"));
        assert!(text.trim_end().ends_with("END OF SYMBOL TABLE"));
    }
}
