/// Width, in octets, that folded body lines aim to stay within.
///
/// RFC 5322 asks for 78 characters per line; the field name prefix is not
/// known to the body encoder, so two octets are kept back for the fold's
/// leading space.
pub const FOLD_WIDTH: usize = 76;

/// Lays out body tokens, folding at the spaces between them when a line
/// would grow past `max_width`.
///
/// Tokens are never split, so a single token longer than the width gets a
/// line of its own.
pub struct HeaderFieldFormatter {
    max_width: usize,
    buffer: String,
    // width of the line currently being filled
    line_width: usize,
}

impl HeaderFieldFormatter {
    pub fn new(max_width: usize) -> Self {
        Self {
            max_width,
            buffer: String::new(),
            line_width: 0,
        }
    }

    /// Appends `token`. With `space`, a single space separates it from the
    /// previous token and the line may be folded there; without, the token is
    /// glued on.
    pub fn push(&mut self, token: &str, space: bool) {
        if self.buffer.is_empty() {
            self.buffer.push_str(token);
            self.line_width = token.len();
            return;
        }
        if !space {
            self.buffer.push_str(token);
            self.line_width += token.len();
        } else if self.line_width + 1 + token.len() <= self.avail() {
            self.buffer.push(' ');
            self.buffer.push_str(token);
            self.line_width += 1 + token.len();
        } else {
            // the fold keeps the space as the continuation line's lead
            self.buffer.push_str("\r\n ");
            self.buffer.push_str(token);
            self.line_width = 1 + token.len();
        }
    }

    pub fn finish(self) -> String {
        self.buffer
    }

    // maximum space available in a line
    fn avail(&self) -> usize {
        self.max_width
    }
}

/// Folds space-separated `words` at [`FOLD_WIDTH`].
pub fn fold_words<'a, I>(words: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut formatter = HeaderFieldFormatter::new(FOLD_WIDTH);
    for word in words {
        formatter.push(word, true);
    }
    formatter.finish()
}

/// Folds a comma-separated list. Items are kept whole.
pub fn fold_list<I>(items: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut formatter = HeaderFieldFormatter::new(FOLD_WIDTH);
    let mut items = items.into_iter().peekable();
    while let Some(item) = items.next() {
        formatter.push(&item, true);
        if items.peek().is_some() {
            formatter.push(",", false);
        }
    }
    formatter.finish()
}
