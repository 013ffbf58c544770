//! Statement and expression parsers.
//!
//! Programs are parsed line by line: block structure comes from indentation,
//! so every simple statement fits on one line and compound statements own an
//! indented suite. Expressions use plain precedence climbing over the token
//! stream of a single line.

use super::ast::{BinOp, CmpOp, Expr, Stmt, UnaryOp};
use super::token::{tokenize, Token};
use super::LangError;

struct Line {
    indent: usize,
    tokens: Vec<Token>,
}

/// Parse a full program into a statement list.
pub fn parse_program(source: &str) -> Result<Vec<Stmt>, LangError> {
    let lines = logical_lines(source)?;
    let mut pos = 0;
    let stmts = parse_block(&lines, &mut pos, 0)?;
    if pos < lines.len() {
        return Err(LangError::Syntax("unexpected indent".to_string()));
    }
    Ok(stmts)
}

/// Parse source text as a single expression. Assignments and statements are
/// rejected; all tokens must be consumed.
pub fn parse_expression(source: &str) -> Result<Expr, LangError> {
    // Expected-representation text may span lines; brackets never nest deep
    // enough here to need real continuation handling.
    let flat = source.replace(['\n', '\r'], " ");
    let tokens = tokenize(&flat)?;
    if tokens.is_empty() {
        return Err(LangError::Syntax("expected an expression".to_string()));
    }
    let mut parser = ExprParser::new(&tokens);
    let expr = parser.expression()?;
    parser.finish()?;
    Ok(expr)
}

fn logical_lines(source: &str) -> Result<Vec<Line>, LangError> {
    let mut lines = Vec::new();
    for raw in source.lines() {
        let indent = raw.chars().take_while(|c| *c == ' ' || *c == '\t').count();
        let tokens = tokenize(raw)?;
        if tokens.is_empty() {
            continue;
        }
        lines.push(Line { indent, tokens });
    }
    Ok(lines)
}

/// Parse consecutive statements at exactly `indent`, stopping on dedent.
fn parse_block(lines: &[Line], pos: &mut usize, indent: usize) -> Result<Vec<Stmt>, LangError> {
    let mut stmts = Vec::new();
    while *pos < lines.len() {
        let line = &lines[*pos];
        if line.indent < indent {
            break;
        }
        if line.indent > indent {
            return Err(LangError::Syntax("unexpected indent".to_string()));
        }
        stmts.push(parse_stmt(lines, pos)?);
    }
    Ok(stmts)
}

/// Parse the indented suite following a compound-statement header.
fn parse_suite(lines: &[Line], pos: &mut usize, header_indent: usize) -> Result<Vec<Stmt>, LangError> {
    if *pos >= lines.len() || lines[*pos].indent <= header_indent {
        return Err(LangError::Syntax("expected an indented block".to_string()));
    }
    let body_indent = lines[*pos].indent;
    parse_block(lines, pos, body_indent)
}

fn parse_stmt(lines: &[Line], pos: &mut usize) -> Result<Stmt, LangError> {
    let indent = lines[*pos].indent;
    match lines[*pos].tokens.first() {
        Some(Token::Def) => parse_def(lines, pos, indent),
        Some(Token::If) => parse_if(lines, pos, indent),
        Some(Token::While) => parse_while(lines, pos, indent),
        Some(Token::For) => parse_for(lines, pos, indent),
        _ => {
            let stmt = parse_simple(&lines[*pos].tokens)?;
            *pos += 1;
            Ok(stmt)
        }
    }
}

fn parse_def(lines: &[Line], pos: &mut usize, indent: usize) -> Result<Stmt, LangError> {
    let tokens = &lines[*pos].tokens;
    let name = match tokens.get(1) {
        Some(Token::Name(name)) => name.clone(),
        _ => return Err(LangError::Syntax("expected function name after 'def'".to_string())),
    };
    if tokens.get(2) != Some(&Token::LParen) {
        return Err(LangError::Syntax("expected '(' in function definition".to_string()));
    }

    let mut params = Vec::new();
    let mut i = 3;
    if tokens.get(i) != Some(&Token::RParen) {
        loop {
            match tokens.get(i) {
                Some(Token::Name(param)) => params.push(param.clone()),
                _ => return Err(LangError::Syntax("expected parameter name".to_string())),
            }
            i += 1;
            match tokens.get(i) {
                Some(Token::Comma) => i += 1,
                Some(Token::RParen) => break,
                _ => return Err(LangError::Syntax("expected ',' or ')' in parameter list".to_string())),
            }
        }
    }
    // i is at RParen
    if tokens.get(i + 1) != Some(&Token::Colon) || tokens.len() != i + 2 {
        return Err(LangError::Syntax("expected ':' at end of function header".to_string()));
    }

    *pos += 1;
    let body = parse_suite(lines, pos, indent)?;
    Ok(Stmt::Def { name, params, body })
}

fn parse_if(lines: &[Line], pos: &mut usize, indent: usize) -> Result<Stmt, LangError> {
    let cond = parse_header_expr(&lines[*pos].tokens, "if")?;
    *pos += 1;
    let body = parse_suite(lines, pos, indent)?;
    let mut branches = vec![(cond, body)];
    let mut orelse = Vec::new();

    while *pos < lines.len() && lines[*pos].indent == indent {
        match lines[*pos].tokens.first() {
            Some(Token::Elif) => {
                let cond = parse_header_expr(&lines[*pos].tokens, "elif")?;
                *pos += 1;
                let body = parse_suite(lines, pos, indent)?;
                branches.push((cond, body));
            }
            Some(Token::Else) => {
                let tokens = &lines[*pos].tokens;
                if tokens.len() != 2 || tokens[1] != Token::Colon {
                    return Err(LangError::Syntax("expected ':' after 'else'".to_string()));
                }
                *pos += 1;
                orelse = parse_suite(lines, pos, indent)?;
                break;
            }
            _ => break,
        }
    }

    Ok(Stmt::If { branches, orelse })
}

fn parse_while(lines: &[Line], pos: &mut usize, indent: usize) -> Result<Stmt, LangError> {
    let cond = parse_header_expr(&lines[*pos].tokens, "while")?;
    *pos += 1;
    let body = parse_suite(lines, pos, indent)?;
    Ok(Stmt::While { cond, body })
}

fn parse_for(lines: &[Line], pos: &mut usize, indent: usize) -> Result<Stmt, LangError> {
    let tokens = &lines[*pos].tokens;
    let target = match tokens.get(1) {
        Some(Token::Name(name)) => name.clone(),
        _ => return Err(LangError::Syntax("expected loop variable after 'for'".to_string())),
    };
    if tokens.get(2) != Some(&Token::In) {
        return Err(LangError::Syntax("expected 'in' in for statement".to_string()));
    }
    let header_len = tokens.len();
    if tokens.last() != Some(&Token::Colon) {
        return Err(LangError::Syntax("expected ':' at end of for header".to_string()));
    }
    let iter = parse_expr_tokens(&tokens[3..header_len - 1])?;

    *pos += 1;
    let body = parse_suite(lines, pos, indent)?;
    Ok(Stmt::For { target, iter, body })
}

/// Parse the expression between a compound keyword and its trailing colon.
fn parse_header_expr(tokens: &[Token], keyword: &str) -> Result<Expr, LangError> {
    if tokens.last() != Some(&Token::Colon) {
        return Err(LangError::Syntax(format!("expected ':' at end of {keyword} header")));
    }
    parse_expr_tokens(&tokens[1..tokens.len() - 1])
}

fn parse_simple(tokens: &[Token]) -> Result<Stmt, LangError> {
    match tokens {
        [Token::Name(target), Token::Assign, rest @ ..] => Ok(Stmt::Assign {
            target: target.clone(),
            value: parse_expr_tokens(rest)?,
        }),
        [Token::Name(target), Token::PlusAssign, rest @ ..] => Ok(Stmt::AugAssign {
            target: target.clone(),
            op: BinOp::Add,
            value: parse_expr_tokens(rest)?,
        }),
        [Token::Name(target), Token::MinusAssign, rest @ ..] => Ok(Stmt::AugAssign {
            target: target.clone(),
            op: BinOp::Sub,
            value: parse_expr_tokens(rest)?,
        }),
        [Token::Name(target), Token::StarAssign, rest @ ..] => Ok(Stmt::AugAssign {
            target: target.clone(),
            op: BinOp::Mul,
            value: parse_expr_tokens(rest)?,
        }),
        [Token::Name(target), Token::SlashAssign, rest @ ..] => Ok(Stmt::AugAssign {
            target: target.clone(),
            op: BinOp::Div,
            value: parse_expr_tokens(rest)?,
        }),
        [Token::Return, rest @ ..] => {
            if rest.is_empty() {
                Ok(Stmt::Return(None))
            } else {
                Ok(Stmt::Return(Some(parse_expr_tokens(rest)?)))
            }
        }
        _ => Ok(Stmt::Expr(parse_expr_tokens(tokens)?)),
    }
}

fn parse_expr_tokens(tokens: &[Token]) -> Result<Expr, LangError> {
    if tokens.is_empty() {
        return Err(LangError::Syntax("expected an expression".to_string()));
    }
    let mut parser = ExprParser::new(tokens);
    let expr = parser.expression()?;
    parser.finish()?;
    Ok(expr)
}

/// Precedence-climbing expression parser over one token slice.
struct ExprParser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> ExprParser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        ExprParser { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<(), LangError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(LangError::Syntax(format!("expected {what}")))
        }
    }

    fn finish(&self) -> Result<(), LangError> {
        if self.pos == self.tokens.len() {
            Ok(())
        } else {
            Err(LangError::Syntax("invalid syntax".to_string()))
        }
    }

    fn expression(&mut self) -> Result<Expr, LangError> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Expr, LangError> {
        let mut left = self.and_expr()?;
        while self.eat(&Token::Or) {
            let right = self.and_expr()?;
            left = Expr::Or {
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, LangError> {
        let mut left = self.not_expr()?;
        while self.eat(&Token::And) {
            let right = self.not_expr()?;
            left = Expr::And {
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> Result<Expr, LangError> {
        if self.eat(&Token::Not) {
            let operand = self.not_expr()?;
            Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            })
        } else {
            self.comparison()
        }
    }

    fn comparison(&mut self) -> Result<Expr, LangError> {
        let left = self.arith()?;
        let op = match self.peek() {
            Some(Token::EqEq) => Some(CmpOp::Eq),
            Some(Token::NotEq) => Some(CmpOp::Ne),
            Some(Token::Lt) => Some(CmpOp::Lt),
            Some(Token::LtEq) => Some(CmpOp::Le),
            Some(Token::Gt) => Some(CmpOp::Gt),
            Some(Token::GtEq) => Some(CmpOp::Ge),
            _ => None,
        };
        match op {
            Some(op) => {
                self.pos += 1;
                let right = self.arith()?;
                Ok(Expr::Compare {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
            None => Ok(left),
        }
    }

    fn arith(&mut self) -> Result<Expr, LangError> {
        let mut left = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.term()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Expr, LangError> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::SlashSlash) => BinOp::FloorDiv,
                Some(Token::Percent) => BinOp::Mod,
                _ => break,
            };
            self.pos += 1;
            let right = self.unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, LangError> {
        let op = match self.peek() {
            Some(Token::Minus) => Some(UnaryOp::Neg),
            Some(Token::Plus) => Some(UnaryOp::Pos),
            _ => None,
        };
        match op {
            Some(op) => {
                self.pos += 1;
                let operand = self.unary()?;
                Ok(Expr::Unary {
                    op,
                    operand: Box::new(operand),
                })
            }
            None => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expr, LangError> {
        let base = self.postfix()?;
        if self.eat(&Token::StarStar) {
            // Right-associative; the exponent may carry its own unary sign
            let exponent = self.unary()?;
            Ok(Expr::Binary {
                op: BinOp::Pow,
                left: Box::new(base),
                right: Box::new(exponent),
            })
        } else {
            Ok(base)
        }
    }

    fn postfix(&mut self) -> Result<Expr, LangError> {
        let mut expr = self.atom()?;
        loop {
            if self.eat(&Token::LParen) {
                let mut args = Vec::new();
                if !self.eat(&Token::RParen) {
                    loop {
                        args.push(self.expression()?);
                        if !self.eat(&Token::Comma) {
                            break;
                        }
                        if self.peek() == Some(&Token::RParen) {
                            break;
                        }
                    }
                    self.expect(&Token::RParen, "')'")?;
                }
                expr = Expr::Call {
                    func: Box::new(expr),
                    args,
                };
            } else if self.eat(&Token::LBracket) {
                let index = self.expression()?;
                self.expect(&Token::RBracket, "']'")?;
                expr = Expr::Index {
                    value: Box::new(expr),
                    index: Box::new(index),
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn atom(&mut self) -> Result<Expr, LangError> {
        let token = self
            .advance()
            .ok_or_else(|| LangError::Syntax("unexpected end of expression".to_string()))?;
        match token {
            Token::Int(value) => Ok(Expr::Int(*value)),
            Token::Float(value) => Ok(Expr::Float(*value)),
            Token::Str(value) => Ok(Expr::Str(value.clone())),
            Token::Name(name) => Ok(Expr::Name(name.clone())),
            Token::True => Ok(Expr::Bool(true)),
            Token::False => Ok(Expr::Bool(false)),
            Token::NoneLit => Ok(Expr::None),
            Token::LParen => {
                let inner = self.expression()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(inner)
            }
            Token::LBracket => {
                let mut items = Vec::new();
                if !self.eat(&Token::RBracket) {
                    loop {
                        items.push(self.expression()?);
                        if !self.eat(&Token::Comma) {
                            break;
                        }
                        if self.peek() == Some(&Token::RBracket) {
                            break;
                        }
                    }
                    self.expect(&Token::RBracket, "']'")?;
                }
                Ok(Expr::List(items))
            }
            _ => Err(LangError::Syntax("invalid syntax".to_string())),
        }
    }
}
