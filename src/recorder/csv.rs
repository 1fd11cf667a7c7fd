//! Minimal CSV codec for the downtime log: comma separated, `"` quoting, rows terminated
//! by `\n` (a preceding `\r` is tolerated on read).

/// One row of an existing log, with the exact source text kept for verbatim rewrites.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow<'a> {
    /// Source text of the row without its line terminator.
    pub raw: &'a str,
    pub fields: Vec<String>,
}

/// Quotes a field if it contains a separator, a quote or a line break.
pub fn encode_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Joins fields into one newline-terminated row.
pub fn encode_row<S: AsRef<str>>(fields: &[S]) -> String {
    let mut row = fields
        .iter()
        .map(|f| encode_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    row.push('\n');
    row
}

/// A quoted field that is still open at the end of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnterminatedQuote {
    /// 1-based line on which the offending row starts.
    pub line: usize,
}

/// Splits a whole log into rows. Quoted fields may span lines. A trailing line without
/// terminator still counts as a row. Blank lines are kept as rows with an empty `raw`.
pub fn split_rows(text: &str) -> Result<Vec<RawRow<'_>>, UnterminatedQuote> {
    let mut rows = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut row_start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        match c {
            '"' if in_quotes => {
                if matches!(chars.peek(), Some((_, '"'))) {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            '\n' if !in_quotes => {
                if field.ends_with('\r') {
                    field.pop();
                }
                fields.push(std::mem::take(&mut field));
                rows.push(RawRow {
                    raw: text[row_start..idx].trim_end_matches('\r'),
                    fields: std::mem::take(&mut fields),
                });
                row_start = idx + 1;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(UnterminatedQuote {
            line: text[..row_start].matches('\n').count() + 1,
        });
    }

    let raw = text[row_start..].trim_end_matches('\r');
    if !raw.is_empty() {
        if field.ends_with('\r') {
            field.pop();
        }
        fields.push(field);
        rows.push(RawRow { raw, fields });
    }
    Ok(rows)
}
