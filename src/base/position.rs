/// Position tracking for AST nodes
///
/// Points are 1-based in lines and 0-based in columns. Columns count characters,
/// offsets into source text are byte offsets.
use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;

use super::Source;

pub const START_LINE: u32 = 1;
pub const START_COLUMN: u32 = 0;
pub const START_POINT: Point = Point {
    line: START_LINE,
    column: START_COLUMN,
};

/// A location in source code.
///
/// For a file containing `HELLO`, the point before `H` is `(1, 0)` and the
/// point after `O` is `(1, 5)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub line: u32,
    pub column: u32,
}

impl Point {
    /// # Panics
    ///
    /// Panics if `line` is 0.
    pub fn new(line: u32, column: u32) -> Self {
        assert!(
            line >= START_LINE,
            "Line should be equal or greater than 1, was {line}"
        );
        Self { line, column }
    }

    pub fn is_before(&self, other: &Point) -> bool {
        self < other
    }

    pub fn is_same_or_before(&self, other: &Point) -> bool {
        self <= other
    }

    pub fn is_same_or_after(&self, other: &Point) -> bool {
        self >= other
    }

    /// Moves the point forward on the same line.
    pub fn plus_columns(&self, columns: u32) -> Point {
        Point::new(self.line, self.column + columns)
    }

    /// The point reached after reading `text` starting from here.
    ///
    /// `\r\n` counts as a single line break.
    pub fn advance(&self, text: &str) -> Point {
        let mut line = self.line;
        let mut column = self.column;
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\r' => {
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    line += 1;
                    column = 0;
                }
                '\n' => {
                    line += 1;
                    column = 0;
                }
                _ => column += 1,
            }
        }
        Point::new(line, column)
    }

    /// Byte offset of this point in `code`, or `None` if the point lies outside it.
    pub fn offset(&self, code: &str) -> Option<usize> {
        let mut line = START_LINE;
        let mut line_start = 0;
        let bytes = code.as_bytes();
        let mut i = 0;
        while line < self.line {
            match bytes.get(i)? {
                b'\r' => {
                    if bytes.get(i + 1) == Some(&b'\n') {
                        i += 1;
                    }
                    line += 1;
                    line_start = i + 1;
                }
                b'\n' => {
                    line += 1;
                    line_start = i + 1;
                }
                _ => {}
            }
            i += 1;
        }
        let rest = &code[line_start..];
        let line_text = rest.split(['\r', '\n']).next().unwrap_or("");
        let mut column = 0;
        for (byte_index, _) in line_text.char_indices() {
            if column == self.column {
                return Some(line_start + byte_index);
            }
            column += 1;
        }
        (column == self.column).then_some(line_start + line_text.len())
    }

    /// A range starting here and spanning `length` columns.
    pub fn range_with_length(&self, length: u32) -> Range {
        Range::new(*self, self.plus_columns(length))
    }

    pub fn as_range(&self) -> Range {
        Range::new(*self, *self)
    }
}

impl Add<&str> for Point {
    type Output = Point;

    fn add(self, text: &str) -> Point {
        self.advance(text)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}, Column {}", self.line, self.column)
    }
}

/// An area in a source, from the point before its first character to the point
/// after its last one. An empty range has coinciding points.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Point,
    pub end: Point,
    pub source: Option<Source>,
}

impl Range {
    /// # Panics
    ///
    /// Panics if `end` comes before `start`. Use [`Range::new_unchecked`] to
    /// bypass validation.
    pub fn new(start: Point, end: Point) -> Self {
        assert!(
            start <= end,
            "End should follow start or be the same as start (start: {start}, end: {end})"
        );
        Self {
            start,
            end,
            source: None,
        }
    }

    pub fn new_unchecked(start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            source: None,
        }
    }

    /// Create a range from line/column coordinates
    pub fn from_coords(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self::new(
            Point::new(start_line, start_col),
            Point::new(end_line, end_col),
        )
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    pub fn is_flat(&self) -> bool {
        self.start == self.end
    }

    /// Whether `point` falls within this range, boundaries included.
    pub fn contains_point(&self, point: Point) -> bool {
        self.start <= point && point <= self.end
    }

    /// Whether `other` lies entirely within this range. Sources are not compared.
    pub fn contains(&self, other: &Range) -> bool {
        self.start <= other.start && self.end >= other.end
    }

    pub fn overlaps(&self, other: &Range) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// The portion of `code` covered by this range.
    pub fn text<'a>(&self, code: &'a str) -> Option<&'a str> {
        let start = self.start.offset(code)?;
        let end = self.end.offset(code)?;
        code.get(start..end)
    }

    /// Length in bytes of the text covered by this range.
    pub fn length(&self, code: &str) -> Option<usize> {
        self.end.offset(code)?.checked_sub(self.start.offset(code)?)
    }
}

impl PartialOrd for Range {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Range {
    fn cmp(&self, other: &Self) -> Ordering {
        self.source
            .cmp(&other.source)
            .then_with(|| self.start.cmp(&other.start))
            .then_with(|| self.end.cmp(&other.end))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Range(start={}, end={}", self.start, self.end)?;
        if let Some(source) = &self.source {
            write!(f, ", source={source}")?;
        }
        write!(f, ")")
    }
}
