/// Coarse token class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    Number,
    Punct,
}

/// A token borrowed from the input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub kind: TokenKind,
}

impl Token<'_> {
    #[must_use]
    pub fn is_punct(&self) -> bool {
        self.kind == TokenKind::Punct
    }
}

/// Whether `ch` at `idx` joins the characters around it into one token.
///
/// Apostrophes join letters ("don't"); dots and commas join digits ("3.5", "1,200").
fn is_joiner(chars: &[(usize, char)], idx: usize) -> bool {
    let (Some(&(_, prev)), Some(&(_, next))) = (
        idx.checked_sub(1).and_then(|i| chars.get(i)),
        chars.get(idx + 1),
    ) else {
        return false;
    };
    match chars[idx].1 {
        '\'' | '\u{2019}' => prev.is_alphabetic() && next.is_alphabetic(),
        '.' | ',' => prev.is_ascii_digit() && next.is_ascii_digit(),
        _ => false,
    }
}

/// Split text into word, number and punctuation tokens. Whitespace is dropped.
#[must_use]
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let (start, ch) = chars[i];
        if ch.is_whitespace() {
            i += 1;
            continue;
        }
        if !ch.is_alphanumeric() {
            let end = start + ch.len_utf8();
            tokens.push(Token {
                text: &text[start..end],
                kind: TokenKind::Punct,
            });
            i += 1;
            continue;
        }
        let mut j = i + 1;
        while j < chars.len() && (chars[j].1.is_alphanumeric() || is_joiner(&chars, j)) {
            j += 1;
        }
        let end = chars.get(j).map_or(text.len(), |&(b, _)| b);
        let word = &text[start..end];
        let kind = if word.chars().any(char::is_alphabetic) {
            TokenKind::Word
        } else {
            TokenKind::Number
        };
        tokens.push(Token { text: word, kind });
        i = j;
    }
    tokens
}
