//! Line lexer for the candidate language.

use super::LangError;

/// One lexical token. Comments and whitespace never reach the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Name(String),
    // Keywords
    Def,
    Return,
    If,
    Elif,
    Else,
    While,
    For,
    In,
    And,
    Or,
    Not,
    True,
    False,
    NoneLit,
    // Operators
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    SlashSlash,
    Percent,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Colon,
}

/// Tokenize a single logical line. A `#` outside a string literal starts a
/// comment running to the end of the line.
pub fn tokenize(line: &str) -> Result<Vec<Token>, LangError> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\r' => {
                i += 1;
            }
            '#' => break,
            '0'..='9' => {
                let (token, next) = lex_number(&chars, i)?;
                tokens.push(token);
                i = next;
            }
            '"' | '\'' => {
                let (token, next) = lex_string(&chars, i)?;
                tokens.push(token);
                i = next;
            }
            _ if c.is_alphabetic() || c == '_' => {
                let (token, next) = lex_word(&chars, i);
                tokens.push(token);
                i = next;
            }
            '+' => {
                i = lex_pair(&chars, i, &mut tokens, Token::PlusAssign, Token::Plus);
            }
            '-' => {
                i = lex_pair(&chars, i, &mut tokens, Token::MinusAssign, Token::Minus);
            }
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    tokens.push(Token::StarStar);
                    i += 2;
                } else {
                    i = lex_pair(&chars, i, &mut tokens, Token::StarAssign, Token::Star);
                }
            }
            '/' => {
                if chars.get(i + 1) == Some(&'/') {
                    tokens.push(Token::SlashSlash);
                    i += 2;
                } else {
                    i = lex_pair(&chars, i, &mut tokens, Token::SlashAssign, Token::Slash);
                }
            }
            '%' => {
                tokens.push(Token::Percent);
                i += 1;
            }
            '=' => {
                i = lex_pair(&chars, i, &mut tokens, Token::EqEq, Token::Assign);
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::NotEq);
                    i += 2;
                } else {
                    return Err(LangError::Syntax("unexpected character '!'".to_string()));
                }
            }
            '<' => {
                i = lex_pair(&chars, i, &mut tokens, Token::LtEq, Token::Lt);
            }
            '>' => {
                i = lex_pair(&chars, i, &mut tokens, Token::GtEq, Token::Gt);
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '[' => {
                tokens.push(Token::LBracket);
                i += 1;
            }
            ']' => {
                tokens.push(Token::RBracket);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            ':' => {
                tokens.push(Token::Colon);
                i += 1;
            }
            _ => {
                return Err(LangError::Syntax(format!("unexpected character '{c}'")));
            }
        }
    }

    Ok(tokens)
}

/// Push `with_eq` if the next character is '=', otherwise `bare`.
fn lex_pair(chars: &[char], i: usize, tokens: &mut Vec<Token>, with_eq: Token, bare: Token) -> usize {
    if chars.get(i + 1) == Some(&'=') {
        tokens.push(with_eq);
        i + 2
    } else {
        tokens.push(bare);
        i + 1
    }
}

fn lex_number(chars: &[char], start: usize) -> Result<(Token, usize), LangError> {
    let mut i = start;
    let mut is_float = false;

    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i < chars.len() && chars[i] == '.' {
        is_float = true;
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }

    let text: String = chars[start..i].iter().collect();
    if is_float {
        let value = text
            .parse::<f64>()
            .map_err(|_| LangError::Syntax(format!("invalid number literal '{text}'")))?;
        Ok((Token::Float(value), i))
    } else {
        let value = text
            .parse::<i64>()
            .map_err(|_| LangError::Value(format!("integer literal '{text}' is too large")))?;
        Ok((Token::Int(value), i))
    }
}

fn lex_string(chars: &[char], start: usize) -> Result<(Token, usize), LangError> {
    let quote = chars[start];
    let mut i = start + 1;
    let mut text = String::new();

    while i < chars.len() {
        let c = chars[i];
        if c == quote {
            return Ok((Token::Str(text), i + 1));
        }
        if c == '\\' {
            let escaped = chars
                .get(i + 1)
                .ok_or_else(|| LangError::Syntax("unterminated string literal".to_string()))?;
            match escaped {
                'n' => text.push('\n'),
                't' => text.push('\t'),
                '\\' => text.push('\\'),
                '\'' => text.push('\''),
                '"' => text.push('"'),
                other => {
                    text.push('\\');
                    text.push(*other);
                }
            }
            i += 2;
        } else {
            text.push(c);
            i += 1;
        }
    }

    Err(LangError::Syntax("unterminated string literal".to_string()))
}

fn lex_word(chars: &[char], start: usize) -> (Token, usize) {
    let mut i = start;
    while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
        i += 1;
    }
    let word: String = chars[start..i].iter().collect();
    let token = match word.as_str() {
        "def" => Token::Def,
        "return" => Token::Return,
        "if" => Token::If,
        "elif" => Token::Elif,
        "else" => Token::Else,
        "while" => Token::While,
        "for" => Token::For,
        "in" => Token::In,
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "True" => Token::True,
        "False" => Token::False,
        "None" => Token::NoneLit,
        _ => Token::Name(word),
    };
    (token, i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_assignment() {
        let tokens = tokenize("foo = 1").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Name("foo".to_string()), Token::Assign, Token::Int(1)]
        );
    }

    #[test]
    fn test_tokenize_operators() {
        let tokens = tokenize("a ** 2 // 3 != b").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Name("a".to_string()),
                Token::StarStar,
                Token::Int(2),
                Token::SlashSlash,
                Token::Int(3),
                Token::NotEq,
                Token::Name("b".to_string()),
            ]
        );
    }

    #[test]
    fn test_tokenize_string_escapes() {
        let tokens = tokenize(r#"'a\nb' "c\'d""#).unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Str("a\nb".to_string()),
                Token::Str("c'd".to_string()),
            ]
        );
    }

    #[test]
    fn test_tokenize_comment_runs_to_end_of_line() {
        let tokens = tokenize("x = 1  # the answer").unwrap();
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_tokenize_float_and_int() {
        let tokens = tokenize("1.5 2").unwrap();
        assert_eq!(tokens, vec![Token::Float(1.5), Token::Int(2)]);
    }

    #[test]
    fn test_tokenize_rejects_unterminated_string() {
        assert!(tokenize("'oops").is_err());
    }

    #[test]
    fn test_tokenize_rejects_unknown_character() {
        assert!(tokenize("a ?").is_err());
    }
}
