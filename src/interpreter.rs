use std::io::{self, BufRead, Write};

use crate::environment::Environment;
use crate::error::{self, ErrorType};
use crate::expr::{Expr, ExprType};
use crate::stmt::{Stmt, StmtType};
use crate::token::TokenType;
use crate::value::{self, Value};

/// Walks the parsed statements against one environment. Evaluation is
/// deliberately tolerant: undefined reads, rejected writes and division by
/// zero resolve to safe defaults and the pass always finishes. Only the
/// surrounding driver can abort a run, and only for unreadable input.
pub struct Interpreter {
    environment: Environment,
    diagnostics: Vec<ErrorType>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            environment: Environment::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn interpret(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.execute(stmt);
        }
    }

    /// Every recorded evaluation-level diagnostic, in occurrence order.
    pub fn diagnostics(&self) -> &[ErrorType] {
        &self.diagnostics
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    fn execute(&mut self, stmt: &Stmt) {
        match &stmt.stmt_type {
            StmtType::Block { body } => {
                // Flat scope: the block changes nothing about visibility.
                for block_stmt in body {
                    self.execute(block_stmt);
                }
            },
            StmtType::Declaration { name, initializer, is_const } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr),
                    None => Value::Int(0),
                };
                self.environment.define(name, value, *is_const);
            },
            StmtType::Assignment { name, operator, value } => {
                let rhs = self.evaluate(value);
                if *operator == TokenType::Equal {
                    self.try_assign(name, rhs, stmt.line);
                } else {
                    // `lhs op= rhs` is `lhs = lhs op rhs`; with no existing
                    // binding there is nothing to combine with.
                    match self.environment.get(name, stmt.line) {
                        Ok(lhs) => {
                            let combined = match operator {
                                TokenType::PlusEqual => value::add(&lhs, &rhs),
                                TokenType::MinusEqual => value::sub(&lhs, &rhs),
                                TokenType::StarEqual => value::mul(&lhs, &rhs),
                                TokenType::SlashEqual => value::div(&lhs, &rhs),
                                TokenType::PercentEqual => value::rem(&lhs, &rhs),
                                _ => unreachable!(),
                            };
                            self.try_assign(name, combined, stmt.line);
                        },
                        Err(e) => self.diagnose(e),
                    }
                }
            },
            StmtType::IncDec { name, increment } => {
                match self.environment.get(name, stmt.line) {
                    Ok(old) => {
                        let new = if *increment {
                            value::add(&old, &Value::Int(1))
                        } else {
                            value::sub(&old, &Value::Int(1))
                        };
                        self.try_assign(name, new, stmt.line);
                    },
                    Err(e) => self.diagnose(e),
                }
            },
            StmtType::Input { name } => {
                print!("Enter value for {}: ", name);
                io::stdout().flush().ok();
                let mut line = String::new();
                if io::stdin().lock().read_line(&mut line).is_ok() {
                    if let Ok(number) = line.trim().parse::<i64>() {
                        self.try_assign(name, Value::Int(number), stmt.line);
                    }
                }
            },
            StmtType::Print { expression } => {
                let value = self.evaluate(expression);
                println!("{}", value);
            },
            StmtType::Call { argument, .. } => {
                // The argument runs for its side effects; calls themselves
                // have no runtime meaning.
                if let Some(expr) = argument {
                    self.evaluate(expr);
                }
            },
            StmtType::If { condition, then_body, else_body } => {
                if self.evaluate(condition).truthy() {
                    self.execute(then_body);
                } else if let Some(else_) = else_body {
                    self.execute(else_);
                }
            },
            StmtType::While { condition, body } => {
                // The body runs exactly once per truthy condition evaluation.
                while self.evaluate(condition).truthy() {
                    self.execute(body);
                }
            },
            StmtType::DoWhile { body, condition } => {
                loop {
                    for body_stmt in body {
                        self.execute(body_stmt);
                    }
                    if !self.evaluate(condition).truthy() {
                        break;
                    }
                }
            },
            StmtType::For { initializer, condition, increment, body } => {
                if let Some(init) = initializer {
                    self.execute(init);
                }
                loop {
                    // An empty condition defaults to true.
                    let keep_going = match condition {
                        Some(expr) => self.evaluate(expr).truthy(),
                        None => true,
                    };
                    if !keep_going {
                        break;
                    }
                    self.execute(body);
                    if let Some(inc) = increment {
                        self.evaluate(inc);
                    }
                }
            },
            StmtType::Foreach { collection, body, .. } => {
                // No collection runtime model: the clause evaluates and the
                // body runs once.
                self.evaluate(collection);
                self.execute(body);
            },
            StmtType::Switch { scrutinee, cases, default } => {
                let value = self.evaluate(scrutinee);
                let mut matched = false;
                for case in cases {
                    let case_value = self.evaluate(&case.value);
                    if value::equals(&case_value, &value) {
                        matched = true;
                        for case_stmt in &case.body {
                            self.execute(case_stmt);
                        }
                    }
                }
                if !matched {
                    if let Some(body) = default {
                        for default_stmt in body {
                            self.execute(default_stmt);
                        }
                    }
                }
            },
            StmtType::Return { value } => {
                // There are no functions to return from; the value still
                // evaluates for its effects.
                if let Some(expr) = value {
                    self.evaluate(expr);
                }
            },
            // Parsed and consumed; no loop-control transfer is defined.
            StmtType::Break | StmtType::Next => (),
            // Syntax-only declarations.
            StmtType::ClassDecl { .. }
            | StmtType::StructDecl { .. }
            | StmtType::EnumDecl { .. }
            | StmtType::RecordDecl { .. } => (),
        }
    }

    fn evaluate(&mut self, expr: &Expr) -> Value {
        match &expr.expr_type {
            ExprType::Literal { value } => value.clone(),
            ExprType::Variable { name } => self.lookup(name, expr.line),
            ExprType::Grouping { expression } => self.evaluate(expression),
            ExprType::Cast { expression } => self.evaluate(expression),
            ExprType::Unary { operator, right } => {
                let right_eval = self.evaluate(right);
                match operator {
                    TokenType::Not => match right_eval {
                        Value::Bool(b) => Value::Bool(!b),
                        other => other,
                    },
                    TokenType::Minus => match right_eval {
                        Value::Int(i) => Value::Int(-i),
                        Value::Double(d) => Value::Double(-d),
                        other => other,
                    },
                    _ => unreachable!(),
                }
            },
            ExprType::Binary { left, operator, right } => {
                // Both operands always evaluate, `&&`/`||` included.
                let left_eval = self.evaluate(left);
                let right_eval = self.evaluate(right);
                match operator {
                    TokenType::Plus => value::add(&left_eval, &right_eval),
                    TokenType::Minus => value::sub(&left_eval, &right_eval),
                    TokenType::Star => value::mul(&left_eval, &right_eval),
                    TokenType::Slash => value::div(&left_eval, &right_eval),
                    TokenType::Percent => value::rem(&left_eval, &right_eval),

                    TokenType::EqualEqual => Value::Bool(value::equals(&left_eval, &right_eval)),
                    TokenType::NotEqual => Value::Bool(!value::equals(&left_eval, &right_eval)),

                    TokenType::Greater => {
                        Value::Bool(value::compare(&left_eval, &right_eval, |a, b| a > b))
                    },
                    TokenType::GreaterEqual => {
                        Value::Bool(value::compare(&left_eval, &right_eval, |a, b| a >= b))
                    },
                    TokenType::Less => {
                        Value::Bool(value::compare(&left_eval, &right_eval, |a, b| a < b))
                    },
                    TokenType::LessEqual => {
                        Value::Bool(value::compare(&left_eval, &right_eval, |a, b| a <= b))
                    },

                    TokenType::AndAnd => {
                        Value::Bool(left_eval.truthy() && right_eval.truthy())
                    },
                    TokenType::OrOr => {
                        Value::Bool(left_eval.truthy() || right_eval.truthy())
                    },
                    _ => unreachable!(),
                }
            },
            ExprType::IncDec { name, increment, prefix } => {
                match self.environment.get(name, expr.line) {
                    Ok(old) => {
                        let new = if *increment {
                            value::add(&old, &Value::Int(1))
                        } else {
                            value::sub(&old, &Value::Int(1))
                        };
                        self.try_assign(name, new.clone(), expr.line);
                        // Prefix yields the mutated value, postfix the
                        // pre-mutation value.
                        if *prefix { new } else { old }
                    },
                    Err(e) => {
                        self.diagnose(e);
                        Value::Int(0)
                    },
                }
            },
        }
    }

    /// Reads a variable; an undefined name records a diagnostic and yields
    /// the default Int 0 instead of failing the statement.
    fn lookup(&mut self, name: &str, line: usize) -> Value {
        match self.environment.get(name, line) {
            Ok(value) => value,
            Err(e) => {
                self.diagnose(e);
                Value::Int(0)
            },
        }
    }

    /// Writes a variable; a rejected write (const or undefined) records a
    /// diagnostic and leaves the binding unchanged.
    fn try_assign(&mut self, name: &str, value: Value, line: usize) {
        if let Err(e) = self.environment.assign(name, value, line) {
            self.diagnose(e);
        }
    }

    fn diagnose(&mut self, e: ErrorType) {
        error::report(&e);
        self.diagnostics.push(e);
    }
}
