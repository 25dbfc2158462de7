use crate::error::{self, ErrorLocation, ErrorType};
use crate::expr::{Expr, ExprType};
use crate::stmt::{Stmt, StmtType, SwitchCase};
use crate::stream::TokenStream;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Collects the `Enter <Rule>` / `Exit <Rule>` diagnostic trace produced
/// while the grammar is driven, two spaces of indent per depth. The parse
/// runs once, so the trace reflects each logical pass exactly once.
pub struct Trace {
    lines: String,
    depth: usize,
}

impl Trace {
    fn new() -> Self {
        Self {
            lines: String::new(),
            depth: 0,
        }
    }

    fn enter(&mut self, rule: &str) {
        self.push_line(&format!("Enter <{}>", rule));
        self.depth += 1;
    }

    fn exit(&mut self, rule: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.push_line(&format!("Exit <{}>", rule));
    }

    fn push_line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.lines.push_str("  ");
        }
        self.lines.push_str(text);
        self.lines.push('\n');
    }

    fn depth(&self) -> usize {
        self.depth
    }

    /// Drops back to a recorded depth after panic-mode recovery abandoned
    /// the rules between.
    fn unwind(&mut self, depth: usize) {
        self.depth = depth;
    }

    pub fn text(&self) -> &str {
        &self.lines
    }
}

pub struct Parser {
    stream: TokenStream,
    errors: Vec<ErrorType>,
    panic_mode: bool,  // Suppresses cascading reports until resynchronization.
    trace: Trace,
}

impl Parser {
    /// Builds a parser over a scanned token sequence. Comment tokens are for
    /// the symbol table only; the grammar never sees them.
    pub fn new(tokens: Vec<Token>) -> Self {
        let filtered: Vec<Token> = tokens
            .into_iter()
            .filter(|t| t.type_ != TokenType::Comment)
            .collect();
        Self {
            stream: TokenStream::new(filtered),
            errors: Vec::new(),
            panic_mode: false,
            trace: Trace::new(),
        }
    }

    /// Interface function. Parsing always completes: a statement that fails
    /// to parse is reported, dropped, and the cursor resynchronizes at the
    /// next statement boundary.
    pub fn parse(&mut self) -> Vec<Stmt> {
        self.trace.enter("Program");
        let mut statements: Vec<Stmt> = Vec::new();
        while !self.check(TokenType::Eof) {
            let depth = self.trace.depth();
            match self.statement() {
                Ok(stmt) => statements.push(stmt),
                Err(e) => {
                    self.errors.push(e);
                    self.trace.unwind(depth);
                    self.synchronize();
                },
            }
        }
        self.trace.exit("Program");
        statements
    }

    pub fn errors(&self) -> &[ErrorType] {
        &self.errors
    }

    pub fn had_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    // --- Statements ---

    fn statement(&mut self) -> Result<Stmt, ErrorType> {
        self.trace.enter("Statement");
        let stmt = self.dispatch_statement()?;
        self.trace.exit("Statement");
        Ok(stmt)
    }

    fn dispatch_statement(&mut self) -> Result<Stmt, ErrorType> {
        let line = self.current().line;
        match self.current().type_ {
            TokenType::PlusPlus | TokenType::MinusMinus => self.prefix_increment_statement(),

            TokenType::Type | TokenType::Str => self.declaration_statement(false),
            TokenType::Var | TokenType::Dyn => {
                self.advance();
                self.declaration_statement(false)
            },
            TokenType::Const => {
                self.advance();
                self.declaration_statement(true)
            },

            TokenType::Let => self.let_statement(),
            TokenType::Set => self.set_statement(),
            TokenType::Input => self.input_statement(),
            TokenType::Print => self.output_statement(),

            TokenType::If => self.if_statement(),
            TokenType::While => {
                self.advance();
                self.while_statement()
            },
            TokenType::For => {
                self.advance();
                self.for_statement()
            },
            TokenType::Foreach => {
                self.advance();
                self.foreach_statement()
            },
            TokenType::Do => {
                self.advance();
                self.do_while_statement()
            },
            TokenType::Switch => {
                self.advance();
                self.switch_statement()
            },
            TokenType::Return => self.return_statement(),

            TokenType::Next => {
                self.trace.enter("NextStatement");
                self.advance();
                self.consume(TokenType::Semicolon, "Expect ';' after 'next'.")?;
                self.trace.exit("NextStatement");
                Ok(Stmt { line, stmt_type: StmtType::Next })
            },
            TokenType::Break => {
                self.advance();
                self.consume(TokenType::Semicolon, "Expect ';' after break.")?;
                Ok(Stmt { line, stmt_type: StmtType::Break })
            },

            TokenType::Class => {
                self.advance();
                self.class_declaration()
            },
            TokenType::Struct => {
                self.advance();
                self.struct_declaration()
            },
            TokenType::Enum => {
                self.advance();
                self.enum_declaration()
            },
            TokenType::Record => {
                self.advance();
                self.record_declaration()
            },
            TokenType::Pub | TokenType::Priv => {
                // Only `pub record` / `priv record` open a statement; anything
                // else rewinds so the error points at the modifier itself.
                let saved = self.stream.position();
                self.advance();
                if self.check(TokenType::Record) {
                    self.advance();
                    self.record_declaration()
                } else {
                    self.stream.rewind(saved);
                    Err(self.error_at_current("Unexpected keyword at start of statement."))
                }
            },

            TokenType::LeftBrace => {
                self.advance();
                self.block()
            },
            TokenType::Identifier => self.identifier_statement(),

            _ if self.current().type_.begins_statement() => {
                // A keyword with no statement form here. Step past it before
                // recovery so resynchronization makes progress.
                let e = self.error_at_current("Unexpected keyword at start of statement.");
                self.advance();
                Err(e)
            },

            _ => {
                // Anything else at statement position is skipped, one token
                // per attempt; end of input stays where it is.
                if !self.check(TokenType::Eof) {
                    self.advance();
                }
                Ok(Stmt { line, stmt_type: StmtType::Block { body: Vec::new() } })
            },
        }
    }

    /// `++x;` / `--x;`.
    fn prefix_increment_statement(&mut self) -> Result<Stmt, ErrorType> {
        self.trace.enter("IncrementStatement");
        let line = self.current().line;
        let increment = self.current().type_ == TokenType::PlusPlus;
        self.advance();
        let name = self
            .consume(TokenType::Identifier, "Expect identifier after prefix operator.")?
            .lexeme;
        self.consume(TokenType::Semicolon, "Expect ';' after increment/decrement.")?;
        self.trace.exit("IncrementStatement");
        Ok(Stmt { line, stmt_type: StmtType::IncDec { name, increment } })
    }

    /// Type-, `str`-, `var`-, `const`- or `dyn`-led declaration. The leading
    /// `var`/`const`/`dyn` keyword is already consumed; a type word is
    /// consumed here when present.
    fn declaration_statement(&mut self, is_const: bool) -> Result<Stmt, ErrorType> {
        self.trace.enter("DeclarationStatement");
        let line = self.current().line;
        self.check_and_consume(&[TokenType::Type, TokenType::Str]);
        let name = self
            .consume(TokenType::Identifier, "Expect variable name.")?
            .lexeme;

        let mut initializer = None;
        if self.check_and_consume(&[TokenType::Equal]).is_some() {
            initializer = Some(self.expression()?);
        }
        self.consume(TokenType::Semicolon, "Expect ';' after variable declaration.")?;
        self.trace.exit("DeclarationStatement");
        Ok(Stmt { line, stmt_type: StmtType::Declaration { name, initializer, is_const } })
    }

    /// `let name = expr;` defines (or redefines) a binding.
    fn let_statement(&mut self) -> Result<Stmt, ErrorType> {
        self.trace.enter("LetStatement");
        let line = self.current().line;
        self.advance();
        let name = self
            .consume(TokenType::Identifier, "Expect variable name after 'let'.")?
            .lexeme;
        self.consume(TokenType::Equal, "Expect '=' after variable name.")?;
        let initializer = self.expression()?;
        self.consume(TokenType::Semicolon, "Expect ';' after let statement.")?;
        self.trace.exit("LetStatement");
        Ok(Stmt {
            line,
            stmt_type: StmtType::Declaration {
                name,
                initializer: Some(initializer),
                is_const: false,
            },
        })
    }

    /// `set name = expr;` assigns to an existing binding.
    fn set_statement(&mut self) -> Result<Stmt, ErrorType> {
        self.trace.enter("SetStatement");
        let line = self.current().line;
        self.advance();
        let name = self
            .consume(TokenType::Identifier, "Expect variable name after 'set'.")?
            .lexeme;
        self.consume(TokenType::Equal, "Expect '=' after variable name.")?;
        let value = self.expression()?;
        self.consume(TokenType::Semicolon, "Expect ';' after set statement.")?;
        self.trace.exit("SetStatement");
        Ok(Stmt {
            line,
            stmt_type: StmtType::Assignment { name, operator: TokenType::Equal, value },
        })
    }

    fn input_statement(&mut self) -> Result<Stmt, ErrorType> {
        self.trace.enter("InputStatement");
        let line = self.current().line;
        self.advance();
        self.consume(TokenType::LeftParen, "Expect '(' after 'input'.")?;
        let name = self
            .consume(TokenType::Identifier, "Expect variable name in input.")?
            .lexeme;
        self.consume(TokenType::RightParen, "Expect ')' after input variable.")?;
        self.consume(TokenType::Semicolon, "Expect ';' after input statement.")?;
        self.trace.exit("InputStatement");
        Ok(Stmt { line, stmt_type: StmtType::Input { name } })
    }

    fn output_statement(&mut self) -> Result<Stmt, ErrorType> {
        self.trace.enter("OutputStatement");
        let line = self.current().line;
        self.advance();
        self.consume(TokenType::LeftParen, "Expect '(' after 'print'.")?;
        let expression = self.expression()?;
        self.consume(TokenType::RightParen, "Expect ')' after print expression.")?;
        self.consume(TokenType::Semicolon, "Expect ';' after print statement.")?;
        self.trace.exit("OutputStatement");
        Ok(Stmt { line, stmt_type: StmtType::Print { expression } })
    }

    fn if_statement(&mut self) -> Result<Stmt, ErrorType> {
        self.trace.enter("IfStatement");
        let line = self.current().line;
        self.advance();
        self.check_and_consume(&[TokenType::NoiseWord]);  // `if at (...)`.
        self.consume(TokenType::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(TokenType::RightParen, "Expect ')' after condition.")?;
        self.check_and_consume(&[TokenType::NoiseWord]);  // `... then {`.

        let then_body = Box::new(self.statement()?);
        let mut else_body = None;
        if self.check_and_consume(&[TokenType::Else]).is_some() {
            // `else if` chains arrive here as a nested if statement.
            else_body = Some(Box::new(self.statement()?));
        }
        self.trace.exit("IfStatement");
        Ok(Stmt { line, stmt_type: StmtType::If { condition, then_body, else_body } })
    }

    fn while_statement(&mut self) -> Result<Stmt, ErrorType> {
        self.trace.enter("WhileStatement");
        let line = self.current().line;
        self.check_and_consume(&[TokenType::NoiseWord]);  // `while its (...)`.
        self.consume(TokenType::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(TokenType::RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.statement()?);
        self.trace.exit("WhileStatement");
        Ok(Stmt { line, stmt_type: StmtType::While { condition, body } })
    }

    fn for_statement(&mut self) -> Result<Stmt, ErrorType> {
        self.trace.enter("ForStatement");
        let line = self.current().line;
        self.consume(TokenType::LeftParen, "Expect '(' after 'for'.")?;

        // The initializer is a declaration or an assignment; each consumes
        // its own terminating ';'.
        let initializer = if self.check_and_consume(&[TokenType::Semicolon]).is_some() {
            None
        } else {
            match self.current().type_ {
                TokenType::Type | TokenType::Str => Some(Box::new(self.declaration_statement(false)?)),
                TokenType::Var | TokenType::Dyn => {
                    self.advance();
                    Some(Box::new(self.declaration_statement(false)?))
                },
                TokenType::Identifier => Some(Box::new(self.identifier_statement()?)),
                _ => {
                    return Err(self.error_at_current(
                        "Expect variable declaration or assignment in for loop.",
                    ))
                },
            }
        };

        let condition = if self.check(TokenType::Semicolon) {
            None  // Defaults to true.
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenType::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if self.check(TokenType::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenType::RightParen, "Expect ')' after for clauses.")?;

        let body = Box::new(self.statement()?);
        self.trace.exit("ForStatement");
        Ok(Stmt { line, stmt_type: StmtType::For { initializer, condition, increment, body } })
    }

    /// `foreach (TYPE x in collection) body` is validated grammatically; the
    /// body runs once since collections have no runtime model.
    fn foreach_statement(&mut self) -> Result<Stmt, ErrorType> {
        self.trace.enter("ForeachStatement");
        let line = self.current().line;
        self.consume(TokenType::LeftParen, "Expect '(' after 'foreach'.")?;
        if self
            .check_and_consume(&[TokenType::Type, TokenType::Str, TokenType::Var])
            .is_none()
        {
            return Err(self.error_at_current("Expect type or 'var' in foreach."));
        }
        let variable = self
            .consume(TokenType::Identifier, "Expect variable name.")?
            .lexeme;
        if self.check_and_consume(&[TokenType::In]).is_none() {
            return Err(self.error_at_current("Expect 'in' after variable."));
        }
        let collection = self.expression()?;
        self.consume(TokenType::RightParen, "Expect ')' after collection.")?;
        let body = Box::new(self.statement()?);
        self.trace.exit("ForeachStatement");
        Ok(Stmt { line, stmt_type: StmtType::Foreach { variable, collection, body } })
    }

    fn do_while_statement(&mut self) -> Result<Stmt, ErrorType> {
        self.trace.enter("DoWhileStatement");
        let line = self.current().line;
        self.consume(TokenType::LeftBrace, "Expect '{' after 'do'.")?;
        let mut body: Vec<Stmt> = Vec::new();
        while !self.check(TokenType::RightBrace) && !self.check(TokenType::Eof) {
            body.push(self.statement()?);
        }
        self.consume(TokenType::RightBrace, "Expect '}' after block.")?;

        if self.check_and_consume(&[TokenType::While]).is_none() {
            return Err(self.error_at_current("Expect 'while' after do-block."));
        }
        self.consume(TokenType::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(TokenType::RightParen, "Expect ')' after condition.")?;
        self.consume(TokenType::Semicolon, "Expect ';' after do-while.")?;
        self.trace.exit("DoWhileStatement");
        Ok(Stmt { line, stmt_type: StmtType::DoWhile { body, condition } })
    }

    fn switch_statement(&mut self) -> Result<Stmt, ErrorType> {
        self.trace.enter("SwitchStatement");
        let line = self.current().line;
        self.consume(TokenType::LeftParen, "Expect '(' after 'switch'.")?;
        let scrutinee = self.expression()?;
        self.consume(TokenType::RightParen, "Expect ')' after switch expression.")?;
        self.consume(TokenType::LeftBrace, "Expect '{' before switch cases.")?;

        let mut cases: Vec<SwitchCase> = Vec::new();
        let mut default = None;
        while !self.check(TokenType::RightBrace) && !self.check(TokenType::Eof) {
            if self.check_and_consume(&[TokenType::Case]).is_some() {
                self.trace.enter("CaseClause");
                let value = self.expression()?;
                self.consume(TokenType::Colon, "Expect ':' after case expression.")?;
                let body = self.clause_statements()?;
                self.trace.exit("CaseClause");
                cases.push(SwitchCase { value, body });
            } else if self.check_and_consume(&[TokenType::Default]).is_some() {
                self.trace.enter("DefaultClause");
                self.consume(TokenType::Colon, "Expect ':' after default.")?;
                default = Some(self.clause_statements()?);
                self.trace.exit("DefaultClause");
            } else {
                return Err(self.error_at_current("Expect 'case' or 'default' inside switch."));
            }
        }
        self.consume(TokenType::RightBrace, "Expect '}' after switch body.")?;
        self.trace.exit("SwitchStatement");
        Ok(Stmt { line, stmt_type: StmtType::Switch { scrutinee, cases, default } })
    }

    /// Statements of one case/default clause: up to the next clause or the
    /// closing brace.
    fn clause_statements(&mut self) -> Result<Vec<Stmt>, ErrorType> {
        let mut body: Vec<Stmt> = Vec::new();
        while !self.check(TokenType::Case)
            && !self.check(TokenType::Default)
            && !self.check(TokenType::RightBrace)
            && !self.check(TokenType::Eof)
        {
            body.push(self.statement()?);
        }
        Ok(body)
    }

    fn return_statement(&mut self) -> Result<Stmt, ErrorType> {
        self.trace.enter("ReturnStatement");
        let line = self.current().line;
        self.advance();
        let mut value = None;
        if !self.check(TokenType::Semicolon) {
            value = Some(self.expression()?);
        }
        self.consume(TokenType::Semicolon, "Expect ';' after return value.")?;
        self.trace.exit("ReturnStatement");
        Ok(Stmt { line, stmt_type: StmtType::Return { value } })
    }

    /// An identifier opens an assignment, a call, or a postfix
    /// increment/decrement statement.
    fn identifier_statement(&mut self) -> Result<Stmt, ErrorType> {
        let line = self.current().line;
        let name = self.advance().lexeme;

        match self.current().type_ {
            TokenType::Equal
            | TokenType::PlusEqual
            | TokenType::MinusEqual
            | TokenType::StarEqual
            | TokenType::SlashEqual
            | TokenType::PercentEqual => {
                self.trace.enter("AssignmentStatement");
                let operator = self.advance().type_;
                let value = self.expression()?;
                self.consume(TokenType::Semicolon, "Expect ';' after assignment.")?;
                self.trace.exit("AssignmentStatement");
                Ok(Stmt { line, stmt_type: StmtType::Assignment { name, operator, value } })
            },
            TokenType::LeftParen => {
                self.trace.enter("FunctionCall");
                self.advance();
                let mut argument = None;
                if !self.check(TokenType::RightParen) {
                    argument = Some(self.expression()?);
                }
                self.consume(TokenType::RightParen, "Expect ')' after arguments.")?;
                self.consume(TokenType::Semicolon, "Expect ';' after function call.")?;
                self.trace.exit("FunctionCall");
                Ok(Stmt { line, stmt_type: StmtType::Call { name, argument } })
            },
            TokenType::PlusPlus | TokenType::MinusMinus => {
                self.trace.enter("IncrementStatement");
                let increment = self.advance().type_ == TokenType::PlusPlus;
                self.consume(TokenType::Semicolon, "Expect ';' after increment/decrement.")?;
                self.trace.exit("IncrementStatement");
                Ok(Stmt { line, stmt_type: StmtType::IncDec { name, increment } })
            },
            _ => Err(self.error_at_current("Unexpected identifier usage.")),
        }
    }

    fn block(&mut self) -> Result<Stmt, ErrorType> {
        self.trace.enter("Block");
        let line = self.current().line;
        let mut body: Vec<Stmt> = Vec::new();
        while !self.check(TokenType::RightBrace) && !self.check(TokenType::Eof) {
            body.push(self.statement()?);
        }
        self.consume(TokenType::RightBrace, "Expect '}' after block.")?;
        self.trace.exit("Block");
        Ok(Stmt { line, stmt_type: StmtType::Block { body } })
    }

    // --- Syntax-only declarations ---

    fn class_declaration(&mut self) -> Result<Stmt, ErrorType> {
        self.trace.enter("ClassDeclaration");
        let line = self.current().line;
        let name = self.consume(TokenType::Identifier, "Expect class name.")?.lexeme;
        self.consume(TokenType::LeftBrace, "Expect '{' before class body.")?;

        while !self.check(TokenType::RightBrace) && !self.check(TokenType::Eof) {
            self.check_and_consume(&[TokenType::Pub, TokenType::Priv, TokenType::Prot]);
            self.check_and_consume(&[TokenType::Rdo]);

            if self
                .check_and_consume(&[TokenType::Type, TokenType::Str])
                .is_none()
            {
                return Err(self.error_at_current("Expect type or void in class member."));
            }
            self.consume(TokenType::Identifier, "Expect member name.")?;

            if self.check_and_consume(&[TokenType::LeftParen]).is_some() {
                self.method_declaration()?;
            } else if self.check_and_consume(&[TokenType::LeftBrace]).is_some() {
                self.property_declaration()?;
            } else {
                // Field declaration.
                if self.check_and_consume(&[TokenType::Equal]).is_some() {
                    self.expression()?;
                }
                self.consume(TokenType::Semicolon, "Expect ';' after field.")?;
            }
        }
        self.consume(TokenType::RightBrace, "Expect '}' after class body.")?;
        self.trace.exit("ClassDeclaration");
        Ok(Stmt { line, stmt_type: StmtType::ClassDecl { name } })
    }

    fn method_declaration(&mut self) -> Result<(), ErrorType> {
        self.trace.enter("MethodDeclaration");
        if !self.check(TokenType::RightParen) {
            loop {
                self.check_and_consume(&[TokenType::Type, TokenType::Str]);
                // Contextual keywords are allowed as argument names.
                if self.check(TokenType::Identifier) || self.current().type_.category_name() == "KEYWORD" {
                    self.advance();
                } else {
                    return Err(self.error_at_current("Expect argument name."));
                }
                if self.check_and_consume(&[TokenType::Comma]).is_none() {
                    break;
                }
            }
        }
        self.consume(TokenType::RightParen, "Expect ')' after arguments.")?;
        self.consume(TokenType::LeftBrace, "Expect '{' before method body.")?;
        // The body parses as ordinary statements and is discarded.
        self.block()?;
        self.trace.exit("MethodDeclaration");
        Ok(())
    }

    fn property_declaration(&mut self) -> Result<(), ErrorType> {
        self.trace.enter("PropertyDeclaration");
        while !self.check(TokenType::RightBrace) && !self.check(TokenType::Eof) {
            if self
                .check_and_consume(&[TokenType::Get, TokenType::Set, TokenType::Init])
                .is_some()
            {
                if self.check_and_consume(&[TokenType::LeftBrace]).is_some() {
                    while !self.check(TokenType::RightBrace) && !self.check(TokenType::Eof) {
                        self.statement()?;
                    }
                    self.consume(TokenType::RightBrace, "Expect '}' after accessor body.")?;
                } else {
                    self.consume(TokenType::Semicolon, "Expect ';' after accessor (auto-implemented).")?;
                }
            } else {
                return Err(self.error_at_current("Expect get, set, or init."));
            }
        }
        self.consume(TokenType::RightBrace, "Expect '}' after property body.")?;
        self.trace.exit("PropertyDeclaration");
        Ok(())
    }

    fn struct_declaration(&mut self) -> Result<Stmt, ErrorType> {
        self.trace.enter("StructDefinition");
        let line = self.current().line;
        let name = self.consume(TokenType::Identifier, "Expect struct name.")?.lexeme;
        self.consume(TokenType::LeftBrace, "Expect '{' before struct members.")?;
        while !self.check(TokenType::RightBrace) && !self.check(TokenType::Eof) {
            if self
                .check_and_consume(&[TokenType::Type, TokenType::Str])
                .is_none()
            {
                return Err(self.error_at_current("Expect type in struct member."));
            }
            self.consume(TokenType::Identifier, "Expect member name.")?;
            self.consume(TokenType::Semicolon, "Expect ';' after member.")?;
        }
        self.consume(TokenType::RightBrace, "Expect '}' after struct members.")?;
        self.trace.exit("StructDefinition");
        Ok(Stmt { line, stmt_type: StmtType::StructDecl { name } })
    }

    fn enum_declaration(&mut self) -> Result<Stmt, ErrorType> {
        self.trace.enter("EnumDeclaration");
        let line = self.current().line;
        let name = self.consume(TokenType::Identifier, "Expect enum name.")?.lexeme;
        self.consume(TokenType::LeftBrace, "Expect '{' before enum members.")?;
        while !self.check(TokenType::RightBrace) && !self.check(TokenType::Eof) {
            self.consume(TokenType::Identifier, "Expect enum member name.")?;
            if self.check_and_consume(&[TokenType::Equal]).is_some() {
                self.expression()?;
            }
            if self.check_and_consume(&[TokenType::Comma]).is_none() {
                break;
            }
        }
        self.consume(TokenType::RightBrace, "Expect '}' after enum members.")?;
        self.trace.exit("EnumDeclaration");
        Ok(Stmt { line, stmt_type: StmtType::EnumDecl { name } })
    }

    fn record_declaration(&mut self) -> Result<Stmt, ErrorType> {
        self.trace.enter("RecordDeclaration");
        let line = self.current().line;
        let name = self.consume(TokenType::Identifier, "Expect record name.")?.lexeme;
        self.consume(TokenType::LeftBrace, "Expect '{' before record members.")?;
        while !self.check(TokenType::RightBrace) && !self.check(TokenType::Eof) {
            self.check_and_consume(&[TokenType::Req]);
            if self
                .check_and_consume(&[TokenType::Type, TokenType::Str])
                .is_none()
            {
                return Err(self.error_at_current("Expect type in record member."));
            }
            self.consume(TokenType::Identifier, "Expect member name.")?;
            if self.check_and_consume(&[TokenType::Equal]).is_some() {
                self.expression()?;
            }
            self.consume(TokenType::Semicolon, "Expect ';' after member.")?;
        }
        self.consume(TokenType::RightBrace, "Expect '}' after record members.")?;
        self.trace.exit("RecordDeclaration");
        Ok(Stmt { line, stmt_type: StmtType::RecordDecl { name } })
    }

    // --- Expressions ---

    // expression -> logical_or
    fn expression(&mut self) -> Result<Expr, ErrorType> {
        self.trace.enter("Expression");
        let expr = self.logical_or()?;
        self.trace.exit("Expression");
        Ok(expr)
    }

    // logical_or -> logical_and ("||" logical_and)*
    fn logical_or(&mut self) -> Result<Expr, ErrorType> {
        self.trace.enter("LogicalOr");
        let mut expr = self.logical_and()?;
        while self.check_and_consume(&[TokenType::OrOr]).is_some() {
            let right = self.logical_and()?;
            expr = binary(expr, TokenType::OrOr, right);
        }
        self.trace.exit("LogicalOr");
        Ok(expr)
    }

    // logical_and -> equality ("&&" equality)*
    fn logical_and(&mut self) -> Result<Expr, ErrorType> {
        self.trace.enter("LogicalAnd");
        let mut expr = self.equality()?;
        while self.check_and_consume(&[TokenType::AndAnd]).is_some() {
            let right = self.equality()?;
            expr = binary(expr, TokenType::AndAnd, right);
        }
        self.trace.exit("LogicalAnd");
        Ok(expr)
    }

    // equality -> comparison (("==" | "!=") comparison)*
    fn equality(&mut self) -> Result<Expr, ErrorType> {
        self.trace.enter("Equality");
        let mut expr = self.comparison()?;
        while let Some(operator) =
            self.check_and_consume(&[TokenType::EqualEqual, TokenType::NotEqual])
        {
            let right = self.comparison()?;
            expr = binary(expr, operator.type_, right);
        }
        self.trace.exit("Equality");
        Ok(expr)
    }

    // comparison -> type_conversion ((">" | ">=" | "<" | "<=") type_conversion)*
    fn comparison(&mut self) -> Result<Expr, ErrorType> {
        self.trace.enter("Comparison");
        let mut expr = self.type_conversion()?;
        while let Some(operator) = self.check_and_consume(&[
            TokenType::Greater,
            TokenType::GreaterEqual,
            TokenType::Less,
            TokenType::LessEqual,
        ]) {
            let right = self.type_conversion()?;
            expr = binary(expr, operator.type_, right);
        }
        self.trace.exit("Comparison");
        Ok(expr)
    }

    // type_conversion -> term ("as" TYPE)*
    fn type_conversion(&mut self) -> Result<Expr, ErrorType> {
        self.trace.enter("TypeConversion");
        let mut expr = self.term()?;
        while self.check_and_consume(&[TokenType::As]).is_some() {
            self.consume(TokenType::Type, "Expect type after 'as'.")?;
            let line = expr.line;
            expr = Expr { line, expr_type: ExprType::Cast { expression: Box::new(expr) } };
        }
        self.trace.exit("TypeConversion");
        Ok(expr)
    }

    // term -> factor (("+" | "-") factor)*
    fn term(&mut self) -> Result<Expr, ErrorType> {
        self.trace.enter("Term");
        let mut expr = self.factor()?;
        while let Some(operator) = self.check_and_consume(&[TokenType::Plus, TokenType::Minus]) {
            let right = self.factor()?;
            expr = binary(expr, operator.type_, right);
        }
        self.trace.exit("Term");
        Ok(expr)
    }

    // factor -> unary (("*" | "/" | "%") unary)*
    fn factor(&mut self) -> Result<Expr, ErrorType> {
        self.trace.enter("Factor");
        let mut expr = self.unary()?;
        while let Some(operator) =
            self.check_and_consume(&[TokenType::Star, TokenType::Slash, TokenType::Percent])
        {
            let right = self.unary()?;
            expr = binary(expr, operator.type_, right);
        }
        self.trace.exit("Factor");
        Ok(expr)
    }

    // unary -> ("!" | "-") unary | postfix
    fn unary(&mut self) -> Result<Expr, ErrorType> {
        self.trace.enter("Unary");
        let expr = if let Some(operator) =
            self.check_and_consume(&[TokenType::Not, TokenType::Minus])
        {
            let right = self.unary()?;
            Expr {
                line: operator.line,
                expr_type: ExprType::Unary { operator: operator.type_, right: Box::new(right) },
            }
        } else {
            self.postfix()?
        };
        self.trace.exit("Unary");
        Ok(expr)
    }

    // postfix -> ("++" | "--") IDENTIFIER | primary ("++" | "--")*
    fn postfix(&mut self) -> Result<Expr, ErrorType> {
        self.trace.enter("Prefix/Postfix");
        let expr = if let Some(operator) =
            self.check_and_consume(&[TokenType::PlusPlus, TokenType::MinusMinus])
        {
            let name = self
                .consume(TokenType::Identifier, "Expect identifier after prefix operator.")?
                .lexeme;
            Expr {
                line: operator.line,
                expr_type: ExprType::IncDec {
                    name,
                    increment: operator.type_ == TokenType::PlusPlus,
                    prefix: true,
                },
            }
        } else {
            let mut expr = self.primary()?;
            while let Some(operator) =
                self.check_and_consume(&[TokenType::PlusPlus, TokenType::MinusMinus])
            {
                let ExprType::Variable { name } = expr.expr_type else {
                    return Err(self.error_at_current("Invalid increment/decrement target."));
                };
                expr = Expr {
                    line: expr.line,
                    expr_type: ExprType::IncDec {
                        name,
                        increment: operator.type_ == TokenType::PlusPlus,
                        prefix: false,
                    },
                };
            }
            expr
        };
        self.trace.exit("Prefix/Postfix");
        Ok(expr)
    }

    // primary -> literal | identifier | "(" expression ")"
    fn primary(&mut self) -> Result<Expr, ErrorType> {
        self.trace.enter("Primary");
        let token = self.current().clone();
        let expr = match token.type_ {
            TokenType::Number => {
                self.advance();
                let value = parse_number(&token.lexeme);
                Expr { line: token.line, expr_type: ExprType::Literal { value } }
            },
            TokenType::StringLiteral => {
                self.advance();
                Expr {
                    line: token.line,
                    expr_type: ExprType::Literal { value: Value::String_(token.lexeme) },
                }
            },
            TokenType::CharLiteral => {
                self.advance();
                let c = token.lexeme.chars().next().unwrap_or('\0');
                Expr { line: token.line, expr_type: ExprType::Literal { value: Value::Char(c) } }
            },
            TokenType::True | TokenType::False => {
                self.advance();
                Expr {
                    line: token.line,
                    expr_type: ExprType::Literal {
                        value: Value::Bool(token.type_ == TokenType::True),
                    },
                }
            },
            TokenType::Null => {
                self.advance();
                Expr { line: token.line, expr_type: ExprType::Literal { value: Value::Null } }
            },
            TokenType::LeftParen => {
                self.advance();
                let expression = self.expression()?;
                self.consume(TokenType::RightParen, "Expect ')' after expression.")?;
                Expr {
                    line: token.line,
                    expr_type: ExprType::Grouping { expression: Box::new(expression) },
                }
            },
            // Identifiers, and contextual keywords used as names.
            TokenType::Identifier => {
                self.advance();
                Expr { line: token.line, expr_type: ExprType::Variable { name: token.lexeme } }
            },
            _ if token.type_.category_name() == "KEYWORD" => {
                self.advance();
                Expr { line: token.line, expr_type: ExprType::Variable { name: token.lexeme } }
            },
            _ => {
                self.trace.exit("Primary");
                return Err(self.error_at_current("Expect expression."));
            },
        };
        self.trace.exit("Primary");
        Ok(expr)
    }

    // --- Cursor helpers ---

    fn current(&self) -> &Token {
        self.stream.current()
    }

    fn advance(&mut self) -> Token {
        self.stream.advance()
    }

    /// Returns `true` if the next token's type is `expected`.
    fn check(&self, expected: TokenType) -> bool {
        self.current().type_ == expected
    }

    /// Returns `Some(Token)` and advances if the next token's type is one of
    /// the `expected_types`. Otherwise returns `None`.
    fn check_and_consume(&mut self, expected_types: &[TokenType]) -> Option<Token> {
        if expected_types.contains(&self.current().type_) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn consume(&mut self, expected: TokenType, message: &str) -> Result<Token, ErrorType> {
        if self.check(expected) {
            Ok(self.advance())
        } else {
            Err(self.error_at_current(message))
        }
    }

    /// Builds a syntax error at the current token. The first error of a
    /// panic enters panic mode and is reported; anything after that is
    /// suppressed until resynchronization.
    fn error_at_current(&mut self, message: &str) -> ErrorType {
        let token = self.current();
        let location = match token.type_ {
            TokenType::Eof => ErrorLocation::EndOfInput,
            TokenType::Invalid => ErrorLocation::Invalid,
            _ => ErrorLocation::Lexeme(token.raw.clone()),
        };
        let e = ErrorType::SyntaxError {
            message: String::from(message),
            line: token.line,
            column: token.column,
            location,
        };
        if self.panic_mode {
            e
        } else {
            self.panic_mode = true;
            error::report_and_return(e)
        }
    }

    /// Panic-mode recovery: skip tokens until a statement boundary, which is
    /// either a semicolon (consumed) or the start of a keyword-, type- or
    /// reserved-word-led statement.
    fn synchronize(&mut self) {
        self.panic_mode = false;
        while !self.check(TokenType::Eof) {
            if self.check(TokenType::Semicolon) {
                self.advance();
                return;
            }
            if self.current().type_.begins_statement() {
                return;
            }
            self.advance();
        }
    }
}

fn binary(left: Expr, operator: TokenType, right: Expr) -> Expr {
    Expr {
        line: left.line,
        expr_type: ExprType::Binary {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        },
    }
}

/// A number lexeme is a Double when it carries a fraction or an exponent.
fn parse_number(lexeme: &str) -> Value {
    if lexeme.contains(|c| matches!(c, '.' | 'e' | 'E')) {
        Value::Double(lexeme.parse().unwrap_or(0.0))
    } else {
        Value::Int(lexeme.parse().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{ErrorLocation, ErrorType};
    use crate::expr::{Expr, ExprType};
    use crate::stmt::{Stmt, StmtType};
    use crate::token::TokenType;
    use crate::tokenizer::Tokenizer;
    use crate::value::Value;

    use super::Parser;

    fn parse(source: &str) -> (Vec<Stmt>, Vec<ErrorType>) {
        let tokens = Tokenizer::new(source).tokenize();
        let mut parser = Parser::new(tokens);
        let statements = parser.parse();
        (statements, parser.errors().to_vec())
    }

    fn parse_ok(source: &str) -> Vec<Stmt> {
        let (statements, errors) = parse(source);
        assert!(errors.is_empty(), "unexpected parse errors: {:?}", errors);
        statements
    }

    fn literal(line: usize, value: Value) -> Expr {
        Expr { line, expr_type: ExprType::Literal { value } }
    }

    #[test]
    fn factor_binds_tighter_than_term() {
        let statements = parse_ok("let x = 1 + 2 * 3;");
        let StmtType::Declaration { initializer: Some(init), .. } = &statements[0].stmt_type
        else {
            panic!("expected declaration");
        };
        assert_eq!(
            *init,
            Expr {
                line: 1,
                expr_type: ExprType::Binary {
                    left: Box::new(literal(1, Value::Int(1))),
                    operator: TokenType::Plus,
                    right: Box::new(Expr {
                        line: 1,
                        expr_type: ExprType::Binary {
                            left: Box::new(literal(1, Value::Int(2))),
                            operator: TokenType::Star,
                            right: Box::new(literal(1, Value::Int(3))),
                        },
                    }),
                },
            }
        );
    }

    #[test]
    fn declaration_forms() {
        let statements = parse_ok("int a = 1; var b = 2; const c = 3; str s = \"x\"; dyn d;");
        let consts: Vec<bool> = statements
            .iter()
            .map(|s| match &s.stmt_type {
                StmtType::Declaration { is_const, .. } => *is_const,
                other => panic!("expected declaration, got {:?}", other),
            })
            .collect();
        assert_eq!(consts, vec![false, false, true, false, false]);
    }

    #[test]
    fn compound_assignment_keeps_the_operator() {
        let statements = parse_ok("x += 2;");
        assert_eq!(
            statements[0].stmt_type,
            StmtType::Assignment {
                name: String::from("x"),
                operator: TokenType::PlusEqual,
                value: literal(1, Value::Int(2)),
            }
        );
    }

    #[test]
    fn if_with_noise_words_and_else() {
        let statements = parse_ok("if at (1 > 0) then { print(1); } else { print(2); }");
        let StmtType::If { else_body, .. } = &statements[0].stmt_type else {
            panic!("expected if");
        };
        assert!(else_body.is_some());
    }

    #[test]
    fn while_with_noise_word() {
        let statements = parse_ok("while its (x < 3) { x = x + 1; }");
        assert!(matches!(statements[0].stmt_type, StmtType::While { .. }));
    }

    #[test]
    fn for_clauses() {
        let statements = parse_ok("for (int i = 0; i < 3; i++) { print(i); }");
        let StmtType::For { initializer, condition, increment, .. } = &statements[0].stmt_type
        else {
            panic!("expected for");
        };
        assert!(initializer.is_some());
        assert!(condition.is_some());
        assert_eq!(
            increment.as_ref().map(|e| &e.expr_type),
            Some(&ExprType::IncDec {
                name: String::from("i"),
                increment: true,
                prefix: false,
            })
        );
    }

    #[test]
    fn empty_for_condition_is_none() {
        let statements = parse_ok("for (i = 0;; i++) { break; }");
        let StmtType::For { condition, .. } = &statements[0].stmt_type else {
            panic!("expected for");
        };
        assert!(condition.is_none());
    }

    #[test]
    fn switch_cases_and_default() {
        let statements = parse_ok(
            "switch (x) { case 1: print(1); case 2: print(2); default: print(0); }",
        );
        let StmtType::Switch { cases, default, .. } = &statements[0].stmt_type else {
            panic!("expected switch");
        };
        assert_eq!(cases.len(), 2);
        assert!(default.is_some());
    }

    #[test]
    fn do_while() {
        let statements = parse_ok("do { x = x + 1; } while (x < 3);");
        assert!(matches!(statements[0].stmt_type, StmtType::DoWhile { .. }));
    }

    #[test]
    fn contextual_keyword_reads_as_a_variable() {
        let statements = parse_ok("print(global);");
        let StmtType::Print { expression } = &statements[0].stmt_type else {
            panic!("expected print");
        };
        assert_eq!(
            expression.expr_type,
            ExprType::Variable { name: String::from("global") }
        );
    }

    #[test]
    fn class_parses_for_shape_only() {
        let statements = parse_ok(
            "class Point {\
                pub int x = 0;\
                priv int y;\
                pub int length(int dx, int dy) { return dx + dy; }\
                pub int size { get; set { x = 1; } }\
            }",
        );
        assert_eq!(
            statements[0].stmt_type,
            StmtType::ClassDecl { name: String::from("point") }
        );
    }

    #[test]
    fn struct_enum_record() {
        let statements = parse_ok(
            "struct S { int a; str b; } enum E { red, green = 2 } record R { req int id; str name = \"x\"; }",
        );
        assert!(matches!(statements[0].stmt_type, StmtType::StructDecl { .. }));
        assert!(matches!(statements[1].stmt_type, StmtType::EnumDecl { .. }));
        assert!(matches!(statements[2].stmt_type, StmtType::RecordDecl { .. }));
    }

    #[test]
    fn truncated_if_reports_one_error_and_resynchronizes() {
        let (statements, errors) = parse("if (x > ");
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0],
            ErrorType::SyntaxError {
                message: String::from("Expect expression."),
                line: 1,
                column: 9,
                location: ErrorLocation::EndOfInput,
            }
        );
        assert!(statements.is_empty());
    }

    #[test]
    fn error_recovery_continues_at_the_next_statement() {
        let (statements, errors) = parse("let = 5;\nprint(1);");
        assert_eq!(errors.len(), 1);
        // The second statement still parses after resynchronization.
        assert!(matches!(statements[0].stmt_type, StmtType::Print { .. }));
    }

    #[test]
    fn missing_semicolon_reports_the_offending_token() {
        let (_, errors) = parse("let x = 1\nprint(x);");
        let ErrorType::SyntaxError { location, line, .. } = &errors[0] else {
            panic!("expected syntax error");
        };
        assert_eq!(*location, ErrorLocation::Lexeme(String::from("print")));
        assert_eq!(*line, 2);
    }

    #[test]
    fn trace_is_emitted_once_per_pass() {
        let tokens = Tokenizer::new("while (x < 3) { x = x + 1; }").tokenize();
        let mut parser = Parser::new(tokens);
        parser.parse();
        let trace = parser.trace().text();
        // One parse, one WhileStatement entry, regardless of how many times
        // the loop would run.
        assert_eq!(trace.matches("Enter <WhileStatement>").count(), 1);
        assert!(trace.starts_with("Enter <Program>"));
        assert!(trace.trim_end().ends_with("Exit <Program>"));
    }

    #[test]
    fn comments_never_reach_the_grammar() {
        let statements = parse_ok("// note\nlet x = /* inline */ 1;");
        assert!(matches!(statements[0].stmt_type, StmtType::Declaration { .. }));
    }
}
