use crate::expr::Expr;
use crate::token::TokenType;

#[derive(Debug, PartialEq)]
pub struct Stmt {
    pub line: usize,
    pub stmt_type: StmtType,
}

#[derive(Debug, PartialEq)]
pub struct SwitchCase {
    pub value: Expr,
    pub body: Vec<Stmt>,
}

#[derive(Debug, PartialEq)]
pub enum StmtType {
    Block {
        body: Vec<Stmt>,
    },
    Declaration {
        name: String,
        initializer: Option<Expr>,
        is_const: bool,
    },
    Assignment {
        name: String,
        operator: TokenType,  // `=` or a compound form: `lhs op= rhs` is `lhs = lhs op rhs`.
        value: Expr,
    },
    IncDec {
        name: String,
        increment: bool,
    },
    Input {
        name: String,
    },
    Print {
        expression: Expr,
    },
    Call {
        // A call statement: the argument is evaluated for its effects, the
        // call itself has no runtime meaning.
        name: String,
        argument: Option<Expr>,
    },
    If {
        condition: Expr,
        then_body: Box<Stmt>,
        else_body: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Vec<Stmt>,
        condition: Expr,
    },
    For {
        initializer: Option<Box<Stmt>>,
        condition: Option<Expr>,  // Empty condition defaults to true.
        increment: Option<Expr>,
        body: Box<Stmt>,
    },
    Foreach {
        variable: String,
        collection: Expr,
        body: Box<Stmt>,
    },
    Switch {
        scrutinee: Expr,
        cases: Vec<SwitchCase>,
        default: Option<Vec<Stmt>>,
    },
    Return {
        value: Option<Expr>,
    },
    Break,
    Next,

    // Syntax-only declarations: parsed for grammatical validity, never
    // given runtime meaning.
    ClassDecl { name: String },
    StructDecl { name: String },
    EnumDecl { name: String },
    RecordDecl { name: String },
}
