use logos::Logos;
use std::fmt;
use std::ops::Range;

/// Token types for editor markup (the HTML subset a rich-text editor emits)
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token<'src> {
    #[regex(r"</[a-zA-Z][a-zA-Z0-9]*[^>]*>", |lex| lex.slice())]
    CloseTag(&'src str),

    #[regex(r"<[a-zA-Z][a-zA-Z0-9]*[^>]*>", |lex| lex.slice())]
    OpenTag(&'src str),

    #[regex(r"&#[0-9]+;|&#[xX][0-9a-fA-F]+;|&[a-zA-Z]+;", |lex| lex.slice())]
    Entity(&'src str),

    #[regex(r"[^<&]+", |lex| lex.slice())]
    Text(&'src str),
}

impl<'src> Token<'src> {
    pub fn slice(&self) -> &'src str {
        match self {
            Token::CloseTag(s) | Token::OpenTag(s) | Token::Entity(s) | Token::Text(s) => s,
        }
    }
}

impl<'src> fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::CloseTag(s) => write!(f, "close tag {}", s),
            Token::OpenTag(s) => write!(f, "open tag {}", s),
            Token::Entity(s) => write!(f, "entity {}", s),
            Token::Text(s) => write!(f, "text '{}'", s),
        }
    }
}

/// Tokenize markup. Stray `<` and `&` that start no tag or entity come back
/// as text, so the token spans always cover the whole input.
pub fn tokenize(source: &str) -> Vec<(Token<'_>, Range<usize>)> {
    Token::lexer(source)
        .spanned()
        .map(|(result, span)| match result {
            Ok(token) => (token, span),
            Err(()) => (Token::Text(&source[span.clone()]), span),
        })
        .collect()
}
