//! Formula parser
//!
//! A recursive descent parser for cell contents. It does not build a tree
//! itself: it reports operands and operators to an [`ExprBuilder`] in
//! postfix order and leaves tree construction to the builder.

use crate::builder::{ExprBuilder, DANGLING_REFERENCE};
use crate::error::{FormulaError, FormulaResult};
use lazy_regex::regex_is_match;

/// Parse cell contents, reporting them to `builder`
///
/// Contents that do not start with `=` are literals: a number if the whole
/// text reads as one, otherwise the raw text. Contents starting with `=`
/// are parsed as a formula.
///
/// # Example
/// ```rust
/// use fitsheet_core::CellPosition;
/// use fitsheet_formula::{parse_contents, FormulaBuilder};
///
/// let mut builder = FormulaBuilder::new(CellPosition::parse("B1").unwrap());
/// parse_contents("=A1+A2*A3", &mut builder).unwrap();
/// assert_eq!(builder.dependencies(), ["A1", "A2", "A3"]);
/// assert_eq!(builder.build_ast().unwrap().to_string(), "A1+(A2*A3)");
/// ```
pub fn parse_contents<B: ExprBuilder + ?Sized>(contents: &str, builder: &mut B) -> FormulaResult<()> {
    let Some(formula) = contents.strip_prefix('=') else {
        match parse_literal_number(contents) {
            Some(n) => builder.val_number(n),
            None => builder.val_string(contents),
        }
        return Ok(());
    };

    let mut parser = FormulaParser::new(formula, builder)?;
    parser.parse_expression()?;

    // Make sure we consumed all input
    if !matches!(parser.current_token(), Token::Eof) {
        return Err(FormulaError::Parse(format!(
            "Unexpected {:?} after expression",
            parser.current_token()
        )));
    }

    Ok(())
}

fn parse_literal_number(text: &str) -> Option<f64> {
    if regex_is_match!(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$", text) {
        text.parse().ok()
    } else {
        None
    }
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    // Literals
    Number(f64),
    String(String),

    // Identifiers and references
    Identifier(String), // Function name
    CellRef(String),    // Cell reference like A1, $A$1
    DanglingRef,        // #REF!

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    Colon,
    Comma,

    // Delimiters
    LeftParen,
    RightParen,

    // End of input
    Eof,
}

/// Formula parser
struct FormulaParser<'a, B: ?Sized> {
    input: &'a str,
    pos: usize,
    current_token: Token,
    builder: &'a mut B,
}

impl<'a, B: ExprBuilder + ?Sized> FormulaParser<'a, B> {
    fn new(input: &'a str, builder: &'a mut B) -> FormulaResult<Self> {
        let mut parser = Self {
            input,
            pos: 0,
            current_token: Token::Eof,
            builder,
        };
        parser.advance_token()?;
        Ok(parser)
    }

    // === Token scanning ===

    fn advance_token(&mut self) -> FormulaResult<()> {
        self.current_token = self.scan_token()?;
        Ok(())
    }

    fn scan_token(&mut self) -> FormulaResult<Token> {
        self.skip_whitespace();

        let Some(c) = self.peek_char() else {
            return Ok(Token::Eof);
        };

        // Single-character tokens
        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '^' => Some(Token::Caret),
            '=' => Some(Token::Equal),
            ':' => Some(Token::Colon),
            ',' => Some(Token::Comma),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return Ok(token);
        }

        // Two-character operators
        if c == '<' {
            self.advance();
            if self.peek_char() == Some('=') {
                self.advance();
                return Ok(Token::LessEqual);
            } else if self.peek_char() == Some('>') {
                self.advance();
                return Ok(Token::NotEqual);
            }
            return Ok(Token::LessThan);
        }

        if c == '>' {
            self.advance();
            if self.peek_char() == Some('=') {
                self.advance();
                return Ok(Token::GreaterEqual);
            }
            return Ok(Token::GreaterThan);
        }

        if c == '"' {
            return self.scan_string();
        }

        if c.is_ascii_digit()
            || (c == '.' && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }

        if c == '#' {
            return self.scan_dangling_reference();
        }

        if c.is_ascii_alphabetic() || c == '_' || c == '$' {
            return Ok(self.scan_identifier_or_ref());
        }

        Err(FormulaError::Parse(format!(
            "Unexpected character '{}' at offset {}",
            c, self.pos
        )))
    }

    fn scan_string(&mut self) -> FormulaResult<Token> {
        let start = self.pos;
        self.advance(); // Skip opening quote

        let mut s = String::new();
        loop {
            match self.peek_char() {
                Some('"') => {
                    self.advance();
                    // A doubled quote is an escaped quote
                    if self.peek_char() == Some('"') {
                        s.push('"');
                        self.advance();
                    } else {
                        return Ok(Token::String(s));
                    }
                }
                Some(c) => {
                    s.push(c);
                    self.advance();
                }
                None => {
                    return Err(FormulaError::Parse(format!(
                        "Unterminated string starting at offset {}",
                        start
                    )))
                }
            }
        }
    }

    fn scan_number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;

        // Integer part
        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        // Decimal part
        if self.peek_char() == Some('.') {
            self.advance();
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        // Exponent part
        if self.peek_char().map_or(false, |c| c == 'e' || c == 'E') {
            self.advance();
            if self.peek_char().map_or(false, |c| c == '+' || c == '-') {
                self.advance();
            }
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let num_str = &self.input[start..self.pos];
        num_str
            .parse()
            .map(Token::Number)
            .map_err(|_| FormulaError::Parse(format!("Invalid number '{}'", num_str)))
    }

    fn scan_dangling_reference(&mut self) -> FormulaResult<Token> {
        let rest = &self.input[self.pos..];
        match rest.get(..DANGLING_REFERENCE.len()) {
            Some(head) if head.eq_ignore_ascii_case(DANGLING_REFERENCE) => {
                self.pos += DANGLING_REFERENCE.len();
                Ok(Token::DanglingRef)
            }
            _ => Err(FormulaError::Parse(format!(
                "Unexpected '#' at offset {}",
                self.pos
            ))),
        }
    }

    fn scan_identifier_or_ref(&mut self) -> Token {
        let start = self.pos;

        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        {
            self.advance();
        }

        let text = &self.input[start..self.pos];

        // LOG10(...) is a function call, not a cell reference
        if Self::is_cell_reference(text) && self.peek_char() != Some('(') {
            return Token::CellRef(text.to_string());
        }

        Token::Identifier(text.to_string())
    }

    /// `[$]LETTERS[$]DIGITS`
    fn is_cell_reference(text: &str) -> bool {
        regex_is_match!(r"^\$?[A-Za-z]+\$?[0-9]+$", text)
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn current_token(&self) -> &Token {
        &self.current_token
    }

    fn consume(&mut self) -> FormulaResult<Token> {
        let token = std::mem::replace(&mut self.current_token, Token::Eof);
        self.advance_token()?;
        Ok(token)
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        if self.current_token() == expected {
            self.consume()?;
            Ok(())
        } else {
            Err(FormulaError::Parse(format!(
                "Expected {:?}, got {:?}",
                expected,
                self.current_token()
            )))
        }
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Comparison: =, <>, <, <=, >, >=
    // 2. Addition/Subtraction: +, -
    // 3. Multiplication/Division: *, /
    // 4. Unary: -, +
    // 5. Exponentiation: ^ (right operand may carry signs)
    // 6. Primary: literals, references, ranges, function calls, parentheses

    fn parse_expression(&mut self) -> FormulaResult<()> {
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> FormulaResult<()> {
        self.parse_additive()?;

        loop {
            let op: fn(&mut B) = match self.current_token() {
                Token::Equal => B::op_eq,
                Token::NotEqual => B::op_ne,
                Token::LessThan => B::op_lt,
                Token::LessEqual => B::op_le,
                Token::GreaterThan => B::op_gt,
                Token::GreaterEqual => B::op_ge,
                _ => break,
            };

            self.consume()?;
            self.parse_additive()?;
            op(self.builder);
        }

        Ok(())
    }

    fn parse_additive(&mut self) -> FormulaResult<()> {
        self.parse_multiplicative()?;

        loop {
            let op: fn(&mut B) = match self.current_token() {
                Token::Plus => B::op_add,
                Token::Minus => B::op_sub,
                _ => break,
            };

            self.consume()?;
            self.parse_multiplicative()?;
            op(self.builder);
        }

        Ok(())
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<()> {
        self.parse_unary()?;

        loop {
            let op: fn(&mut B) = match self.current_token() {
                Token::Star => B::op_mul,
                Token::Slash => B::op_div,
                _ => break,
            };

            self.consume()?;
            self.parse_unary()?;
            op(self.builder);
        }

        Ok(())
    }

    fn parse_unary(&mut self) -> FormulaResult<()> {
        match self.current_token() {
            Token::Minus => {
                self.consume()?;
                self.parse_unary()?;
                self.builder.op_neg();
                Ok(())
            }
            // Prefix plus (no-op)
            Token::Plus => {
                self.consume()?;
                self.parse_unary()
            }
            _ => self.parse_exponent(),
        }
    }

    fn parse_exponent(&mut self) -> FormulaResult<()> {
        self.parse_range()?;

        while matches!(self.current_token(), Token::Caret) {
            self.consume()?;
            self.parse_exponent_operand()?;
            self.builder.op_pow();
        }

        Ok(())
    }

    fn parse_exponent_operand(&mut self) -> FormulaResult<()> {
        match self.current_token() {
            Token::Minus => {
                self.consume()?;
                self.parse_exponent_operand()?;
                self.builder.op_neg();
                Ok(())
            }
            Token::Plus => {
                self.consume()?;
                self.parse_exponent_operand()
            }
            _ => self.parse_range(),
        }
    }

    fn parse_range(&mut self) -> FormulaResult<()> {
        let Token::CellRef(start) = self.current_token().clone() else {
            return self.parse_primary();
        };
        self.consume()?;

        if !matches!(self.current_token(), Token::Colon) {
            return self.builder.val_reference(&start);
        }

        self.consume()?;
        match self.consume()? {
            Token::CellRef(end) => {
                self.builder.val_range(&format!("{}:{}", start, end));
                Ok(())
            }
            other => Err(FormulaError::Parse(format!(
                "Expected cell reference after ':', got {:?}",
                other
            ))),
        }
    }

    fn parse_primary(&mut self) -> FormulaResult<()> {
        match self.consume()? {
            Token::Number(n) => {
                self.builder.val_number(n);
                Ok(())
            }

            Token::String(s) => {
                self.builder.val_string(&s);
                Ok(())
            }

            Token::DanglingRef => self.builder.val_reference(DANGLING_REFERENCE),

            Token::LeftParen => {
                self.parse_expression()?;
                self.expect(&Token::RightParen)
            }

            Token::Identifier(name) => {
                if matches!(self.current_token(), Token::LeftParen) {
                    self.parse_function_call(&name)
                } else {
                    Err(FormulaError::Parse(format!("Unknown name '{}'", name)))
                }
            }

            other => Err(FormulaError::Parse(format!("Unexpected token: {:?}", other))),
        }
    }

    fn parse_function_call(&mut self, name: &str) -> FormulaResult<()> {
        self.expect(&Token::LeftParen)?;

        let mut arg_count = 0;

        // Parse arguments
        if !matches!(self.current_token(), Token::RightParen) {
            self.parse_expression()?;
            arg_count += 1;

            while matches!(self.current_token(), Token::Comma) {
                self.consume()?;
                self.parse_expression()?;
                arg_count += 1;
            }
        }

        self.expect(&Token::RightParen)?;
        self.builder.func_call(&name.to_uppercase(), arg_count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::FormulaBuilder;
    use fitsheet_core::CellPosition;
    use pretty_assertions::assert_eq;

    /// Records events as text so the emission order is visible
    #[derive(Default)]
    struct EventLog(Vec<String>);

    impl EventLog {
        fn push(&mut self, event: impl Into<String>) {
            self.0.push(event.into());
        }
    }

    impl ExprBuilder for EventLog {
        fn op_add(&mut self) {
            self.push("+");
        }
        fn op_sub(&mut self) {
            self.push("-");
        }
        fn op_mul(&mut self) {
            self.push("*");
        }
        fn op_div(&mut self) {
            self.push("/");
        }
        fn op_pow(&mut self) {
            self.push("^");
        }
        fn op_neg(&mut self) {
            self.push("neg");
        }
        fn op_eq(&mut self) {
            self.push("=");
        }
        fn op_ne(&mut self) {
            self.push("<>");
        }
        fn op_lt(&mut self) {
            self.push("<");
        }
        fn op_le(&mut self) {
            self.push("<=");
        }
        fn op_gt(&mut self) {
            self.push(">");
        }
        fn op_ge(&mut self) {
            self.push(">=");
        }
        fn val_number(&mut self, value: f64) {
            self.push(format!("n:{}", value));
        }
        fn val_string(&mut self, value: &str) {
            self.push(format!("s:{}", value));
        }
        fn val_reference(&mut self, text: &str) -> FormulaResult<()> {
            self.push(format!("r:{}", text));
            Ok(())
        }
        fn val_range(&mut self, text: &str) {
            self.push(format!("range:{}", text));
        }
        fn func_call(&mut self, name: &str, arg_count: usize) {
            self.push(format!("call:{}/{}", name, arg_count));
        }
    }

    fn events(contents: &str) -> Vec<String> {
        let mut log = EventLog::default();
        parse_contents(contents, &mut log).unwrap();
        log.0
    }

    fn tree(contents: &str) -> String {
        let mut builder = FormulaBuilder::new(CellPosition::parse("A1").unwrap());
        parse_contents(contents, &mut builder).unwrap();
        builder.build_ast().unwrap().to_string()
    }

    #[test]
    fn test_literal_contents() {
        assert_eq!(events("10"), ["n:10"]);
        assert_eq!(events("20.5"), ["n:20.5"]);
        assert_eq!(events("3e1"), ["n:30"]);
        assert_eq!(events("-4"), ["n:-4"]);
        assert_eq!(events(".5"), ["n:0.5"]);
        assert_eq!(events("abc"), ["s:abc"]);
        assert_eq!(events(" 10"), ["s: 10"]);
        assert_eq!(events("\"quoted\"\nline"), ["s:\"quoted\"\nline"]);
        assert_eq!(events("1e"), ["s:1e"]);
    }

    #[test]
    fn test_postfix_order() {
        assert_eq!(events("=1+2*3"), ["n:1", "n:2", "n:3", "*", "+"]);
        assert_eq!(events("=(1+2)*3"), ["n:1", "n:2", "+", "n:3", "*"]);
        assert_eq!(events("=1-2-3"), ["n:1", "n:2", "-", "n:3", "-"]);
        assert_eq!(events("=A1>=B$2"), ["r:A1", "r:B$2", ">="]);
    }

    #[test]
    fn test_unary_binds_looser_than_power() {
        assert_eq!(events("=-A1^2"), ["r:A1", "n:2", "^", "neg"]);
        assert_eq!(events("=2^-3"), ["n:2", "n:3", "neg", "^"]);
        assert_eq!(events("=2^3^2"), ["n:2", "n:3", "^", "n:2", "^"]);
        assert_eq!(events("=+-+5"), ["n:5", "neg"]);
    }

    #[test]
    fn test_strings() {
        assert_eq!(events("=\"Hello\""), ["s:Hello"]);
        assert_eq!(events("=\"say \"\"hi\"\"\""), ["s:say \"hi\""]);
        assert_eq!(events("=\"\""), ["s:"]);
    }

    #[test]
    fn test_ranges_and_functions() {
        assert_eq!(events("=SUM(A1:B2, 3)"), ["range:A1:B2", "n:3", "call:SUM/2"]);
        assert_eq!(events("=log10(100)"), ["n:100", "call:LOG10/1"]);
        assert_eq!(events("=NOW()"), ["call:NOW/0"]);
    }

    #[test]
    fn test_dangling_reference() {
        assert_eq!(events("=#REF!+1"), ["r:#REF!", "n:1", "+"]);
    }

    #[test]
    fn test_tree_shapes() {
        assert_eq!(tree("=A1+A2*A3"), "A1+(A2*A3)");
        assert_eq!(tree("= -A1 ^ 2 - A2 /  2   "), "(-(A1^2))-(A2/2)");
        assert_eq!(tree("=($A1+A$2)^2"), "($A1+A$2)^2");
        assert_eq!(tree("=1=1"), "1=1");
    }

    #[test]
    fn test_parse_errors() {
        let mut log = EventLog::default();
        for bad in [
            "=", "=1+", "=(1", "=1)", "=\"open", "=A1 B1", "=foo", "=A1:", "=1 ? 2", "=#N/A",
            "=SUM(1,", "=1e",
        ] {
            assert!(
                matches!(parse_contents(bad, &mut log), Err(FormulaError::Parse(_))),
                "{:?} should not parse",
                bad
            );
        }
    }

    #[test]
    fn test_builder_rejects_bad_reference() {
        let mut builder = FormulaBuilder::new(CellPosition::parse("A1").unwrap());
        let result = parse_contents("=A01+1", &mut builder);
        assert!(matches!(result, Err(FormulaError::InvalidReference(_))));
    }
}
