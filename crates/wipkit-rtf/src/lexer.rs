//! Tokenizer for rich-text markup.

use crate::{Error, Result};

/// One markup token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// `{`
    GroupStart,
    /// `}`, with its offset for error reporting.
    GroupEnd { offset: usize },
    /// `\name` or `\nameN`, one trailing space consumed.
    Word { name: &'a [u8], param: Option<i32> },
    /// `\` followed by a non-letter.
    Symbol(u8),
    /// `\'hh`
    Hex(u8),
    /// Any other byte. Raw line breaks never reach this variant.
    Text(u8),
}

/// Byte-level tokenizer.
#[derive(Debug)]
pub(crate) struct Lexer<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Skip raw bytes (the payload of `\binN`).
    pub(crate) fn skip(&mut self, count: usize) {
        self.position = self.position.saturating_add(count).min(self.data.len());
    }

    pub(crate) fn next_token(&mut self) -> Result<Option<Token<'a>>> {
        loop {
            let Some(&byte) = self.data.get(self.position) else {
                return Ok(None);
            };
            let offset = self.position;
            self.position += 1;

            let token = match byte {
                b'{' => Token::GroupStart,
                b'}' => Token::GroupEnd { offset },
                b'\r' | b'\n' => continue,
                b'\\' => self.escape(offset)?,
                _ => Token::Text(byte),
            };
            return Ok(Some(token));
        }
    }

    fn escape(&mut self, offset: usize) -> Result<Token<'a>> {
        let Some(&byte) = self.data.get(self.position) else {
            return Err(Error::DanglingEscape { offset });
        };

        if byte.is_ascii_alphabetic() {
            return self.control_word(offset);
        }
        self.position += 1;

        if byte != b'\'' {
            return Ok(Token::Symbol(byte));
        }

        let digits = self
            .data
            .get(self.position..self.position + 2)
            .ok_or(Error::InvalidHex { offset })?;
        let value = match (hex_digit(digits[0]), hex_digit(digits[1])) {
            (Some(high), Some(low)) => (high << 4) | low,
            _ => return Err(Error::InvalidHex { offset }),
        };
        self.position += 2;
        Ok(Token::Hex(value))
    }

    fn control_word(&mut self, offset: usize) -> Result<Token<'a>> {
        let start = self.position;
        while self.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
            self.position += 1;
        }
        let name = &self.data[start..self.position];

        let param_start = self.position;
        if self.peek() == Some(b'-')
            && self
                .data
                .get(self.position + 1)
                .is_some_and(|b| b.is_ascii_digit())
        {
            self.position += 1;
        }
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.position += 1;
        }

        let param = if self.position > param_start {
            let digits = std::str::from_utf8(&self.data[param_start..self.position])
                .ok()
                .and_then(|text| text.parse::<i32>().ok())
                .ok_or(Error::InvalidParameter { offset })?;
            Some(digits)
        } else {
            None
        };

        // A single space delimits the control word and is not content.
        if self.peek() == Some(b' ') {
            self.position += 1;
        }

        Ok(Token::Word { name, param })
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.data.get(self.position).copied()
    }
}

fn hex_digit(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|d| d as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(data: &[u8]) -> Vec<Token<'_>> {
        let mut lexer = Lexer::new(data);
        let mut out = Vec::new();
        while let Some(token) = lexer.next_token().unwrap() {
            out.push(token);
        }
        out
    }

    #[test]
    fn test_control_word_with_param_and_space() {
        assert_eq!(
            tokens(b"\\fs16 a"),
            vec![
                Token::Word {
                    name: b"fs",
                    param: Some(16)
                },
                Token::Text(b'a'),
            ]
        );
    }

    #[test]
    fn test_negative_param() {
        assert_eq!(
            tokens(b"\\u-4064?"),
            vec![
                Token::Word {
                    name: b"u",
                    param: Some(-4064)
                },
                Token::Text(b'?'),
            ]
        );
    }

    #[test]
    fn test_hyphen_without_digits_is_text() {
        assert_eq!(
            tokens(b"\\pard-x"),
            vec![
                Token::Word {
                    name: b"pard",
                    param: None
                },
                Token::Text(b'-'),
                Token::Text(b'x'),
            ]
        );
    }

    #[test]
    fn test_symbols_hex_and_line_breaks() {
        assert_eq!(
            tokens(b"\\{\r\n\\'b5}"),
            vec![
                Token::Symbol(b'{'),
                Token::Hex(0xb5),
                Token::GroupEnd { offset: 8 },
            ]
        );
    }

    #[test]
    fn test_errors() {
        let mut lexer = Lexer::new(b"ab\\");
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        assert_eq!(
            lexer.next_token(),
            Err(Error::DanglingEscape { offset: 2 })
        );

        let mut lexer = Lexer::new(b"\\'g1");
        assert_eq!(lexer.next_token(), Err(Error::InvalidHex { offset: 0 }));

        let mut lexer = Lexer::new(b"\\u99999999999");
        assert_eq!(
            lexer.next_token(),
            Err(Error::InvalidParameter { offset: 0 })
        );
    }
}
