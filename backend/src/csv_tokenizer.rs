//! Tokenizer for quoted CSV as exported by the SWORD and BibleData tools.
//!
//! Fields may contain commas, doubled quotes and newlines when quoted.
//! The tokenizer is a small state machine over chars and yields one record
//! (`Vec<String>`) at a time.

use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Outside quotes, at a field start or inside an unquoted field.
    Normal,
    /// Inside a quoted field.
    InQuotes,
    /// Saw a quote while in a quoted field: either an escaped `""` or the closing quote.
    QuoteInQuotes,
}

pub struct CsvTokenizer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> CsvTokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
        CsvTokenizer {
            chars: text.chars().peekable(),
        }
    }

    fn next_record(&mut self) -> Option<Vec<String>> {
        let mut record: Vec<String> = Vec::new();
        let mut field = String::new();
        let mut state = State::Normal;
        // Anything besides a line ending, so `""` alone is a record and an empty line is not.
        let mut line_has_content = false;

        loop {
            let Some(c) = self.chars.next() else {
                if !line_has_content {
                    return None;
                }
                // An unterminated quote at EOF still yields the partial field.
                record.push(field);
                return Some(record);
            };
            if state != State::Normal || !matches!(c, '\r' | '\n') {
                line_has_content = true;
            }

            match state {
                State::Normal => match c {
                    '"' if field.is_empty() => state = State::InQuotes,
                    ',' => record.push(std::mem::take(&mut field)),
                    '\r' if self.chars.peek() == Some(&'\n') => {}
                    '\r' | '\n' if !line_has_content => {}
                    '\r' | '\n' => {
                        record.push(field);
                        return Some(record);
                    }
                    _ => field.push(c),
                },
                State::InQuotes => match c {
                    '"' => state = State::QuoteInQuotes,
                    _ => field.push(c),
                },
                State::QuoteInQuotes => match c {
                    '"' => {
                        field.push('"');
                        state = State::InQuotes;
                    }
                    ',' => {
                        record.push(std::mem::take(&mut field));
                        state = State::Normal;
                    }
                    '\r' if self.chars.peek() == Some(&'\n') => state = State::Normal,
                    '\r' | '\n' => {
                        record.push(field);
                        return Some(record);
                    }
                    // Stray text after a closing quote is kept as part of the field.
                    _ => {
                        field.push(c);
                        state = State::Normal;
                    }
                },
            }
        }
    }
}

impl Iterator for CsvTokenizer<'_> {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record()
    }
}

/// Tokenize the whole text.
pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    CsvTokenizer::new(text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_records() {
        let rows = parse_csv("a,b,c\n1,2,3\n");
        assert_eq!(rows, vec![vec!["a", "b", "c"], vec!["1", "2", "3"]]);
    }

    #[test]
    fn test_quoted_fields() {
        let rows = parse_csv("\"a, b\",\"say \"\"hi\"\"\",c");
        assert_eq!(rows, vec![vec!["a, b", "say \"hi\"", "c"]]);
    }

    #[test]
    fn test_multiline_field() {
        let text = "section,subject,entry\r\nA,AARON,\"-Lineage of\r\nEXO 6:16-20\r\n-Marriage of\r\nEXO 6:23\"\r\nB,BABEL,GEN 11:9\r\n";
        let rows = parse_csv(text);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][2], "-Lineage of\r\nEXO 6:16-20\r\n-Marriage of\r\nEXO 6:23");
        assert_eq!(rows[2], vec!["B", "BABEL", "GEN 11:9"]);
    }

    #[test]
    fn test_bom_and_blank_lines() {
        let rows = parse_csv("\u{FEFF}x,y\n\n\r\n1,2");
        assert_eq!(rows, vec![vec!["x", "y"], vec!["1", "2"]]);
    }

    #[test]
    fn test_empty_fields() {
        let rows = parse_csv(",,\n\"\",a,");
        assert_eq!(rows, vec![vec!["", "", ""], vec!["", "a", ""]]);
    }

    #[test]
    fn test_lone_quoted_empty_field_is_a_record() {
        let rows = parse_csv("name\n\"\"\n\nx\r\n\"\"");
        assert_eq!(rows, vec![vec!["name"], vec![""], vec!["x"], vec![""]]);
    }

    #[test]
    fn test_unterminated_quote() {
        let rows = parse_csv("a,\"open field\nstill open");
        assert_eq!(rows, vec![vec!["a", "open field\nstill open"]]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_csv("").is_empty());
        assert!(parse_csv("\n\n").is_empty());
    }
}
