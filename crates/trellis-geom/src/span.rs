/// A half-open interval `[start, end)` along one axis.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Span {
    /// Start coordinate.
    pub start: i32,
    /// End coordinate.
    pub end: i32,
}

impl Span {
    /// Construct a span from its endpoints.
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// Construct a span from a start and a length.
    pub fn sized(start: i32, len: i32) -> Self {
        Self {
            start,
            end: start + len,
        }
    }

    /// Length of the span. Negative when the span is inverted.
    pub fn len(&self) -> i32 {
        self.end - self.start
    }

    /// True when the span covers nothing.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Shift the span by `d`.
    pub fn shift(&self, d: i32) -> Self {
        Self {
            start: self.start + d,
            end: self.end + d,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_basics() {
        let s = Span::sized(10, 5);
        assert_eq!(s, Span::new(10, 15));
        assert_eq!(s.len(), 5);
        assert!(!s.is_empty());
        assert_eq!(s.shift(-10), Span::new(0, 5));
        assert!(Span::new(4, 2).is_empty());
    }
}
