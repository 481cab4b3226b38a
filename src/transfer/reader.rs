use std::borrow::Cow;
use std::mem;

/// Interpret uploaded bytes as UTF-8, replacing invalid sequences
pub fn decode_upload(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

/// Split a CSV document into logical rows of cleaned fields.
///
/// A double quote anywhere in a field opens or closes a quoted span, and
/// `""` inside a span is a literal quote. Commas and newlines inside a span
/// belong to the field. Rows that are blank after trimming are dropped, a
/// leading byte-order mark is ignored, and rows may have any number of
/// fields.
pub fn read_rows(text: &str) -> Vec<Vec<String>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut rows = Vec::new();
    let mut row = RowBuilder::default();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
                row.push('"');
            }
            '"' => {
                in_quotes = !in_quotes;
                row.has_content = true;
            }
            ',' if !in_quotes => row.end_field(),
            '\n' if !in_quotes => rows.extend(row.finish()),
            c => row.push(c),
        }
    }
    rows.extend(row.finish());

    rows
}

#[derive(Debug, Default)]
struct RowBuilder {
    fields: Vec<String>,
    current: String,
    // anything but whitespace seen since the last row break
    has_content: bool,
}

impl RowBuilder {
    fn push(&mut self, c: char) {
        if !c.is_whitespace() {
            self.has_content = true;
        }
        self.current.push(c);
    }

    fn end_field(&mut self) {
        self.has_content = true;
        let field = mem::take(&mut self.current);
        self.fields.push(clean_field(&field));
    }

    /// Close the row; `None` when it held nothing but whitespace
    fn finish(&mut self) -> Option<Vec<String>> {
        let keep = self.has_content;
        self.end_field();
        self.has_content = false;
        let fields = mem::take(&mut self.fields);
        keep.then_some(fields)
    }
}

/// Trim and drop stray quote characters left around a field
fn clean_field(raw: &str) -> String {
    let value = raw.trim();
    let value = value.strip_prefix('"').unwrap_or(value);
    let value = value.strip_suffix('"').unwrap_or(value);
    value.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_commas_stay_in_one_field() {
        let rows = read_rows("Name,Tasting Notes\nLaphroaig 10,\"Smoky, peaty, 10/10\"\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["Laphroaig 10", "Smoky, peaty, 10/10"]);
    }

    #[test]
    fn quotes_after_a_space_still_open_a_span() {
        let rows = read_rows(
            "Name, Tasting Notes, Distillery\nLaphroaig 10, \"Smoky, peaty, 10/10\", Laphroaig\n",
        );
        assert_eq!(rows[0], vec!["Name", "Tasting Notes", "Distillery"]);
        assert_eq!(rows[1], vec!["Laphroaig 10", "Smoky, peaty, 10/10", "Laphroaig"]);

        let rows = read_rows("x, \"a, b\"");
        assert_eq!(rows, vec![vec!["x", "a, b"]]);
    }

    #[test]
    fn quotes_inside_a_field_toggle_the_span() {
        let rows = read_rows("Name,Age\nPappy \"Van Winkle\" 15,15\n");
        assert_eq!(rows[1], vec!["Pappy Van Winkle 15", "15"]);

        let rows = read_rows("Notes,Age\nCherry \"oak, leather\" finish,12\n");
        assert_eq!(rows[1], vec!["Cherry oak, leather finish", "12"]);
    }

    #[test]
    fn doubled_quotes_are_literal() {
        let rows = read_rows("Name\n\"The \"\"Pappy\"\" shelf pick\"\n");
        assert_eq!(rows[1], vec!["The \"Pappy\" shelf pick"]);
    }

    #[test]
    fn quoted_newlines_do_not_split_rows() {
        let rows = read_rows("Name,Notes\nBlanton's,\"line one\nline two\"\nStagg,x\n");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][1], "line one\nline two");
        assert_eq!(rows[2][0], "Stagg");
    }

    #[test]
    fn drops_blank_rows_and_bom() {
        let rows = read_rows("\u{feff}Name,Type\n\n   \nEagle Rare,bourbon\r\n\n");
        assert_eq!(rows, vec![vec!["Name", "Type"], vec!["Eagle Rare", "bourbon"]]);
    }

    #[test]
    fn keeps_rows_of_empty_fields() {
        let rows = read_rows("Name,Type\n,,\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["", "", ""]);
    }

    #[test]
    fn short_rows_are_allowed() {
        let rows = read_rows("Name,Type,Distillery\nWeller\n");
        assert_eq!(rows[1], vec!["Weller"]);
    }

    #[test]
    fn lossy_decoding_replaces_invalid_bytes() {
        let text = decode_upload(b"Name\nCaol Il\xff\n");
        assert!(text.contains("Caol Il\u{fffd}"));
    }
}
