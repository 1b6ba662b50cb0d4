//! Placeholder tokenizer
//!
//! Scalar placeholders are written `@key@`. A pair of adjacent `@` with nothing
//! between them is literal text, which keeps table anchors (`@@key@@`) out of
//! the scalar pass.

/// One span of a tokenized text run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text emitted as-is
    Literal(&'a str),
    /// Placeholder key, delimiters stripped
    Placeholder(&'a str),
}

impl Segment<'_> {
    /// Write the segment back in its original form
    pub fn push_original(&self, out: &mut String) {
        match self {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder(key) => {
                out.push('@');
                out.push_str(key);
                out.push('@');
            }
        }
    }
}

/// Split `text` into literal and placeholder segments
pub fn tokenize(text: &str) -> Segments<'_> {
    Segments { rest: text }
}

/// Iterator returned by [`tokenize`]
#[derive(Clone, Debug)]
pub struct Segments<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest;
        if rest.is_empty() {
            return None;
        }

        let mut search = 0;
        loop {
            let Some(open) = rest[search..].find('@').map(|i| search + i) else {
                self.rest = "";
                return Some(Segment::Literal(rest));
            };
            let Some(close) = rest[open + 1..].find('@').map(|i| open + 1 + i) else {
                // Unmatched trailing '@'
                self.rest = "";
                return Some(Segment::Literal(rest));
            };

            if close == open + 1 {
                // "@@" is not an empty placeholder
                search = close + 1;
                continue;
            }

            if open > 0 {
                self.rest = &rest[open..];
                return Some(Segment::Literal(&rest[..open]));
            }

            self.rest = &rest[close + 1..];
            return Some(Segment::Placeholder(&rest[open + 1..close]));
        }
    }
}

/// First table anchor key in `text`, i.e. the `key` of `@@key@@`
pub fn find_table_key(text: &str) -> Option<&str> {
    let mut from = 0;
    while let Some(i) = text[from..].find("@@") {
        let start = from + i + 2;
        let end = text[start..]
            .find('@')
            .map(|n| start + n)
            .unwrap_or(text.len());
        if end > start && text[end..].starts_with("@@") {
            return Some(&text[start..end]);
        }
        from += i + 1;
    }
    None
}
