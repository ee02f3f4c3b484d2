use crate::atom::Atom;
use crate::error::CompileError;
use crate::token::{Token, TokenKind};
use once_cell::sync::Lazy;

static EOF: Lazy<Token> = Lazy::new(|| Token::new(TokenKind::Eof, "EOF"));

fn is_type(token: &Token) -> bool {
    matches!(token.text.as_str(), "num" | "dec")
}

fn is_rel_op(token: &Token) -> bool {
    matches!(token.text.as_str(), ">" | ">=" | "<" | "<=" | "=" | "!")
}

fn is_add_op(token: &Token) -> bool {
    matches!(token.text.as_str(), "+" | "-")
}

fn is_mul_op(token: &Token) -> bool {
    matches!(token.text.as_str(), "*" | "/")
}

fn cmp_code(op: &str) -> u8 {
    match op {
        "=" => 1,
        "<" => 2,
        ">" => 3,
        "<=" => 4,
        ">=" => 5,
        "!=" | "!" => 6,
        _ => 0,
    }
}

/// Recursive-descent parser. Consumes the token sequence positionally with
/// one token of lookahead and emits atoms as each construct reduces; the
/// first unmet expectation aborts the whole compilation.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    atoms: Vec<Atom>,
    temp_counter: usize,
    label_counter: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            atoms: Vec::new(),
            temp_counter: 0,
            label_counter: 0,
        }
    }

    /// Program := StatementList EOF
    pub fn parse(mut self) -> Result<Vec<Atom>, CompileError> {
        self.parse_stmt_list()?;
        if self.current().kind != TokenKind::Eof {
            return Err(CompileError::TrailingTokens(self.current().clone()));
        }
        Ok(self.atoms)
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&EOF)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn eat_text(&mut self, text: &str) -> bool {
        if self.current().text == text {
            self.advance();
            return true;
        }
        false
    }

    fn expect_text(&mut self, text: &str) -> Result<(), CompileError> {
        if self.eat_text(text) {
            Ok(())
        } else {
            Err(CompileError::Expected {
                expected: text.to_string(),
                found: self.current().clone(),
            })
        }
    }

    fn expect_kind(&mut self, kind: TokenKind) -> Result<Token, CompileError> {
        if self.current().kind == kind {
            let token = self.current().clone();
            self.advance();
            Ok(token)
        } else {
            Err(CompileError::Expected {
                expected: kind.to_string(),
                found: self.current().clone(),
            })
        }
    }

    fn new_temp(&mut self) -> String {
        let name = format!("t{}", self.temp_counter);
        self.temp_counter += 1;
        name
    }

    fn new_label(&mut self) -> String {
        let name = format!("L{}", self.label_counter);
        self.label_counter += 1;
        name
    }
}

impl Parser {
    fn starts_stmt(&self) -> bool {
        let token = self.current();
        is_type(token)
            || token.kind == TokenKind::Identifier
            || matches!(token.text.as_str(), "if" | "for" | "during")
    }

    fn starts_expr(&self) -> bool {
        let token = self.current();
        matches!(token.kind, TokenKind::Literal | TokenKind::Identifier) || token.text == "|"
    }

    fn parse_stmt_list(&mut self) -> Result<(), CompileError> {
        while self.starts_stmt() {
            self.parse_stmt()?;
        }
        Ok(())
    }

    /// Statement := VarDecl ";" | Assignment ";" | IfStmt | ForStmt | WhileStmt
    fn parse_stmt(&mut self) -> Result<(), CompileError> {
        let token = self.current();
        if is_type(token) {
            self.parse_var_decl()?;
            self.expect_text(";")
        } else if token.kind == TokenKind::Identifier {
            self.parse_assignment()?;
            self.expect_text(";")
        } else if token.text == "if" {
            self.parse_if_stmt()
        } else if token.text == "for" {
            self.parse_for_stmt()
        } else if token.text == "during" {
            self.parse_during_stmt()
        } else {
            Err(CompileError::InvalidStatement(token.clone()))
        }
    }

    /// VarDecl := ("num" | "dec") Identifier [ Expr ]
    ///
    /// A declaration without an initializer reserves the name but emits
    /// nothing; storage appears when the name is first used.
    fn parse_var_decl(&mut self) -> Result<(), CompileError> {
        self.expect_kind(TokenKind::Keyword)?;
        let dest = self.expect_kind(TokenKind::Identifier)?.text;
        if self.starts_expr() {
            let (src, _) = self.parse_expr()?;
            self.atoms.push(Atom::Mov { src, dest });
        }
        Ok(())
    }

    /// Assignment := Identifier [ "=" ] Expr
    fn parse_assignment(&mut self) -> Result<(), CompileError> {
        let dest = self.expect_kind(TokenKind::Identifier)?.text;
        self.eat_text("=");
        let (src, _) = self.parse_expr()?;
        self.atoms.push(Atom::Mov { src, dest });
        Ok(())
    }

    /// IfStmt := "if" "|" Expr "|" "(" StatementList ")"
    ///           { "elif" "|" Expr "|" "(" StatementList ")" }
    ///           [ "else" "(" StatementList ")" ]
    ///
    /// Each condition tests false into the next branch's label. Only the
    /// `if` body jumps to the shared end label; elif and else bodies fall
    /// through to it.
    fn parse_if_stmt(&mut self) -> Result<(), CompileError> {
        self.expect_text("if")?;
        self.expect_text("|")?;
        let (cond, cmp) = self.parse_expr()?;
        self.expect_text("|")?;

        let else_label = self.new_label();
        let end_label = self.new_label();
        self.atoms.push(Atom::Tst {
            src1: cond,
            src2: "0".to_string(),
            cmp: cmp.unwrap_or(0),
            label: else_label.clone(),
        });

        self.expect_text("(")?;
        self.parse_stmt_list()?;
        self.expect_text(")")?;
        self.atoms.push(Atom::Jmp {
            label: end_label.clone(),
        });
        self.atoms.push(Atom::Lbl { label: else_label });

        while self.current().text == "elif" {
            self.parse_elif()?;
        }
        if self.current().text == "else" {
            self.expect_text("else")?;
            self.expect_text("(")?;
            self.parse_stmt_list()?;
            self.expect_text(")")?;
        }

        self.atoms.push(Atom::Lbl { label: end_label });
        Ok(())
    }

    fn parse_elif(&mut self) -> Result<(), CompileError> {
        self.expect_text("elif")?;
        self.expect_text("|")?;
        let (cond, cmp) = self.parse_expr()?;
        self.expect_text("|")?;

        let else_label = self.new_label();
        self.atoms.push(Atom::Tst {
            src1: cond,
            src2: "0".to_string(),
            cmp: cmp.unwrap_or(0),
            label: else_label.clone(),
        });

        self.expect_text("(")?;
        self.parse_stmt_list()?;
        self.expect_text(")")?;
        self.atoms.push(Atom::Lbl { label: else_label });
        Ok(())
    }

    /// ForStmt := "for" "|" Init "|" Cond "|" Update "|" "(" StatementList ")"
    ///
    /// Init and condition atoms land where they are parsed, ahead of the
    /// loop. The update clause's atoms also land where parsed and are
    /// captured so the same sequence runs again at the bottom of each
    /// iteration.
    fn parse_for_stmt(&mut self) -> Result<(), CompileError> {
        self.expect_text("for")?;
        self.expect_text("|")?;
        self.parse_for_init()?;
        self.expect_text("|")?;
        let (cond, cmp) = self.parse_expr()?;
        self.expect_text("|")?;
        let mark = self.atoms.len();
        self.parse_for_update()?;
        let update: Vec<Atom> = self.atoms[mark..].to_vec();
        self.expect_text("|")?;

        let loop_start = self.new_label();
        let loop_end = self.new_label();
        self.atoms.push(Atom::Lbl {
            label: loop_start.clone(),
        });
        self.atoms.push(Atom::Tst {
            src1: cond,
            src2: "0".to_string(),
            cmp: cmp.unwrap_or(0),
            label: loop_end.clone(),
        });

        self.expect_text("(")?;
        self.parse_stmt_list()?;
        self.expect_text(")")?;

        self.atoms.extend(update);
        self.atoms.push(Atom::Jmp { label: loop_start });
        self.atoms.push(Atom::Lbl { label: loop_end });
        Ok(())
    }

    fn parse_for_init(&mut self) -> Result<(), CompileError> {
        if is_type(self.current()) {
            self.parse_var_decl()?;
        } else if self.current().kind == TokenKind::Identifier {
            self.parse_assignment()?;
        }
        Ok(())
    }

    fn parse_for_update(&mut self) -> Result<(), CompileError> {
        if self.current().kind == TokenKind::Identifier {
            self.parse_assignment()?;
        }
        Ok(())
    }

    /// WhileStmt := "during" "|" Cond "|" "(" StatementList ")"
    fn parse_during_stmt(&mut self) -> Result<(), CompileError> {
        self.expect_text("during")?;
        self.expect_text("|")?;
        let (cond, cmp) = self.parse_expr()?;
        self.expect_text("|")?;

        let loop_start = self.new_label();
        let loop_end = self.new_label();
        self.atoms.push(Atom::Lbl {
            label: loop_start.clone(),
        });
        self.atoms.push(Atom::Tst {
            src1: cond,
            src2: "0".to_string(),
            cmp: cmp.unwrap_or(0),
            label: loop_end.clone(),
        });

        self.expect_text("(")?;
        self.parse_stmt_list()?;
        self.expect_text(")")?;

        self.atoms.push(Atom::Jmp { label: loop_start });
        self.atoms.push(Atom::Lbl { label: loop_end });
        Ok(())
    }
}

impl Parser {
    /// Expr := RelExpr
    ///
    /// Returns the operand name holding the value, plus the comparison code
    /// when the expression was a relational test. The enclosing conditional
    /// reads the code; everything else drops it.
    fn parse_expr(&mut self) -> Result<(String, Option<u8>), CompileError> {
        self.parse_rel_expr()
    }

    /// RelExpr := AddExpr [ RelOp AddExpr ]
    ///
    /// Non-associative: at most one relational operator per expression. The
    /// comparison materializes as a subtraction of the two sides; the test
    /// against zero happens at the TST site.
    fn parse_rel_expr(&mut self) -> Result<(String, Option<u8>), CompileError> {
        let left = self.parse_add_expr()?;
        if is_rel_op(self.current()) {
            let op = self.current().text.clone();
            self.advance();
            let right = self.parse_add_expr()?;
            let result = self.new_temp();
            self.atoms.push(Atom::Sub {
                src1: left,
                src2: right,
                dest: result.clone(),
            });
            return Ok((result, Some(cmp_code(&op))));
        }
        Ok((left, None))
    }

    /// AddExpr := MulExpr { ("+" | "-") MulExpr }, left-associative.
    fn parse_add_expr(&mut self) -> Result<String, CompileError> {
        let mut left = self.parse_mul_expr()?;
        while is_add_op(self.current()) {
            let op = self.current().text.clone();
            self.advance();
            let right = self.parse_mul_expr()?;
            let result = self.new_temp();
            let atom = if op == "+" {
                Atom::Add {
                    src1: left,
                    src2: right,
                    dest: result.clone(),
                }
            } else {
                Atom::Sub {
                    src1: left,
                    src2: right,
                    dest: result.clone(),
                }
            };
            self.atoms.push(atom);
            left = result;
        }
        Ok(left)
    }

    /// MulExpr := Primary { ("*" | "/") Primary }, left-associative.
    fn parse_mul_expr(&mut self) -> Result<String, CompileError> {
        let mut left = self.parse_primary()?;
        while is_mul_op(self.current()) {
            let op = self.current().text.clone();
            self.advance();
            let right = self.parse_primary()?;
            let result = self.new_temp();
            let atom = if op == "*" {
                Atom::Mul {
                    src1: left,
                    src2: right,
                    dest: result.clone(),
                }
            } else {
                Atom::Div {
                    src1: left,
                    src2: right,
                    dest: result.clone(),
                }
            };
            self.atoms.push(atom);
            left = result;
        }
        Ok(left)
    }

    /// Primary := Literal | Identifier | "|" Expr "|"
    ///
    /// A comparison code arising inside the brackets stays inside them.
    fn parse_primary(&mut self) -> Result<String, CompileError> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Literal | TokenKind::Identifier => {
                self.advance();
                Ok(token.text)
            }
            _ if token.text == "|" => {
                self.expect_text("|")?;
                let (value, _) = self.parse_expr()?;
                self.expect_text("|")?;
                Ok(value)
            }
            _ => Err(CompileError::UnexpectedInExpression(token)),
        }
    }
}
