use std::cmp::{ max, min };

/// A byte position inside the source buffer.
///
/// Every delimiter the lexer stops at is ASCII, so the spans formed between
/// two cursors always fall on `char` boundaries.
#[derive(Copy, Clone, Debug)]
pub struct Cursor<'s> {
    input: &'s str,
    current: usize,
}

impl<'s> PartialEq for Cursor<'s> {
    fn eq(&self, other: &Self) -> bool {
        self.current == other.current
    }
}

impl<'s> Eq for Cursor<'s> {}

impl<'s> PartialOrd for Cursor<'s> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<'s> Ord for Cursor<'s> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.current.cmp(&other.current)
    }
}

impl<'s> Cursor<'s> {
    pub fn new(input: &'s str, pos: usize) -> Self {
        Cursor { input, current: pos }
    }

    pub fn pos(&self) -> usize {
        self.current
    }

    pub fn input(&self) -> &'s str {
        self.input
    }

    pub fn valid(&self) -> bool {
        self.current < self.input.len()
    }

    /// The unread part of the input.
    pub fn rest(&self) -> &'s [u8] {
        &self.input.as_bytes()[self.current..]
    }

    pub fn getn(&self, n: usize) -> Option<u8> {
        self.rest().get(n).copied()
    }

    pub fn get(&self) -> Option<u8> {
        self.getn(0)
    }

    pub fn is(&self, c: u8) -> bool {
        self.get() == Some(c)
    }

    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.rest().starts_with(prefix)
    }

    pub fn inc(&mut self) -> &mut Self {
        self.advance(1)
    }

    pub fn advance(&mut self, n: usize) -> &mut Self {
        self.current = min(self.current + n, self.input.len());
        self
    }

    pub fn step_back(&mut self) -> &mut Self {
        self.current = self.current.saturating_sub(1);
        self
    }

    pub fn to_end(&mut self) -> &mut Self {
        self.current = self.input.len();
        self
    }

    /// Number of bytes from the cursor on that satisfy `pred`.
    pub fn span(&self, pred: impl Fn(u8) -> bool) -> usize {
        self.span_at(0, pred)
    }

    pub fn span_at(&self, n: usize, pred: impl Fn(u8) -> bool) -> usize {
        self.rest()
            .iter()
            .skip(n)
            .take_while(|&&c| pred(c))
            .count()
    }

    /// Consumes the bytes that satisfy `pred` and returns how many there were.
    pub fn eat_while(&mut self, pred: impl Fn(u8) -> bool) -> usize {
        let n = self.span(pred);
        self.advance(n);
        n
    }

    pub fn find(&self, needle: &[u8]) -> Option<usize> {
        if needle.is_empty() {
            return Some(0);
        }

        self.rest()
            .windows(needle.len())
            .position(|w| w == needle)
    }

    pub fn form_str(&self, other: &Self) -> &'s str {
        let left = min(self.current, other.current);
        let right = max(self.current, other.current);

        &self.input[left..right]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_and_finds() {
        let mut c = Cursor::new("abc123 */", 0);
        assert_eq!(c.span(|b| b.is_ascii_alphabetic()), 3);
        assert_eq!(c.eat_while(|b| b.is_ascii_alphanumeric()), 6);
        assert_eq!(c.find(b"*/"), Some(1));
        assert_eq!(c.get(), Some(b' '));

        let start = Cursor::new(c.input(), 0);
        assert_eq!(start.form_str(&c), "abc123");
        assert_eq!(c.form_str(&start), "abc123");

        c.to_end();
        assert!(!c.valid());
        assert_eq!(c.get(), None);
        c.inc();
        assert_eq!(c.pos(), 9);
    }
}
