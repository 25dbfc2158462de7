use crate::token::TokenType;

/// One DFA state: a transition per lowercase letter, plus the token type
/// this state accepts when a word ends exactly here.
struct TrieNode {
    transitions: [Option<usize>; 26],
    accepting: Option<TokenType>,
}

impl TrieNode {
    fn new() -> Self {
        Self {
            transitions: [None; 26],
            accepting: None,
        }
    }
}

/// Prefix-tree DFA over the fixed keyword table. Built once at startup and
/// read-only afterwards; classification walks one transition per character.
pub struct KeywordTrie {
    nodes: Vec<TrieNode>,
}

impl KeywordTrie {
    /// Builds the trie from the full keyword/reserved-word/type/boolean/noise
    /// table of the language.
    pub fn new() -> Self {
        let mut trie = Self { nodes: vec![TrieNode::new()] };

        // Contextual keywords.
        trie.add("and", TokenType::And);
        trie.add("args", TokenType::Args);
        trie.add("async", TokenType::Async);
        trie.add("dyn", TokenType::Dyn);
        trie.add("global", TokenType::Global);
        trie.add("input", TokenType::Input);
        trie.add("let", TokenType::Let);
        trie.add("nmof", TokenType::Nmof);
        trie.add("nnull", TokenType::Nnull);
        trie.add("or", TokenType::Or);
        trie.add("print", TokenType::Print);
        trie.add("rec", TokenType::Rec);
        trie.add("stc", TokenType::Stc);
        trie.add("str", TokenType::Str);
        trie.add("this", TokenType::This);
        trie.add("val", TokenType::Val);
        trie.add("var", TokenType::Var);

        // Control flow and structure words.
        trie.add("switch", TokenType::Switch);
        trie.add("case", TokenType::Case);
        trie.add("default", TokenType::Default);
        trie.add("break", TokenType::Break);
        trie.add("next", TokenType::Next);
        trie.add("do", TokenType::Do);
        trie.add("as", TokenType::As);
        trie.add("class", TokenType::Class);
        trie.add("struct", TokenType::Struct);
        trie.add("enum", TokenType::Enum);
        trie.add("record", TokenType::Record);
        trie.add("pub", TokenType::Pub);
        trie.add("priv", TokenType::Priv);
        trie.add("prot", TokenType::Prot);
        trie.add("req", TokenType::Req);
        trie.add("get", TokenType::Get);
        trie.add("set", TokenType::Set);
        trie.add("init", TokenType::Init);

        // Reserved words.
        trie.add("base", TokenType::Base);
        trie.add("const", TokenType::Const);
        trie.add("else", TokenType::Else);
        trie.add("for", TokenType::For);
        trie.add("foreach", TokenType::Foreach);
        trie.add("if", TokenType::If);
        trie.add("iface", TokenType::Iface);
        trie.add("in", TokenType::In);
        trie.add("new", TokenType::New);
        trie.add("nspace", TokenType::Nspace);
        trie.add("null", TokenType::Null);
        trie.add("rdo", TokenType::Rdo);
        trie.add("return", TokenType::Return);
        trie.add("use", TokenType::Use);
        trie.add("while", TokenType::While);

        // Types.
        trie.add("bool", TokenType::Type);
        trie.add("char", TokenType::Type);
        trie.add("double", TokenType::Type);
        trie.add("int", TokenType::Type);
        trie.add("void", TokenType::Type);

        // Boolean literals.
        trie.add("true", TokenType::True);
        trie.add("false", TokenType::False);

        // Noise words.
        trie.add("at", TokenType::NoiseWord);
        trie.add("its", TokenType::NoiseWord);
        trie.add("then", TokenType::NoiseWord);

        trie
    }

    fn add(&mut self, word: &str, type_: TokenType) {
        let mut state = 0;
        for c in word.chars() {
            let Some(index) = letter_index(c.to_ascii_lowercase()) else {
                continue;
            };
            state = match self.nodes[state].transitions[index] {
                Some(next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(TrieNode::new());
                    self.nodes[state].transitions[index] = Some(next);
                    next
                },
            };
        }
        self.nodes[state].accepting = Some(type_);
    }

    /// Classifies a purely alphabetic run. Case is folded for matching only.
    /// Returns `None` unless every character has a transition *and* the final
    /// state accepts the whole string; prefixes of keywords never match.
    pub fn classify(&self, word: &str) -> Option<TokenType> {
        let mut state = 0;
        for c in word.chars() {
            let index = letter_index(c.to_ascii_lowercase())?;
            state = self.nodes[state].transitions[index]?;
        }
        self.nodes[state].accepting
    }
}

fn letter_index(c: char) -> Option<usize> {
    if c.is_ascii_lowercase() {
        Some(c as usize - 'a' as usize)
    } else {
        None
    }
}
