//! Loaders for tabular EEG exports (one column per electrode).
//!
//! Layout: a header row, then one row per time point. The first kept column
//! is a time/index column and is not a channel. Spreadsheet exports often add
//! blank or `Unnamed: N` columns; those are dropped. Delimited text and
//! `.xlsx` workbooks go through the same column rules.

use crate::error::{Error, TableError};
use crate::types::{Channel, Recording};
use calamine::{Data, Reader, Xlsx};
use std::io::Cursor;

/// A header or data row with its 1-based line (or spreadsheet row) number.
type Row = (usize, Vec<String>);

/// Where a table comes from.
#[derive(Clone, Copy, Debug)]
pub enum TableSource<'a> {
    Delimited(&'a str),
    /// `sheet: None` reads the first sheet.
    Workbook { bytes: &'a [u8], sheet: Option<&'a str> },
}

/// Load a recording from either table format.
pub fn load_recording(source: TableSource<'_>, sample_rate: f64) -> Result<Recording, Error> {
    let recording = match source {
        TableSource::Delimited(text) => parse_delimited(text, sample_rate)?,
        TableSource::Workbook { bytes, sheet } => parse_workbook(bytes, sheet, sample_rate)?,
    };
    Ok(recording)
}

/// True for file names that should be read as a workbook.
pub fn is_workbook_name(name: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("xlsx"))
}

/// Parse delimited text into a [`Recording`] sampled at `sample_rate`.
///
/// The delimiter is taken from the header line: tab, then `;`, then `,`.
/// Fields may be double-quoted; a quoted field can contain the delimiter
/// and `""` for a literal quote.
pub fn parse_delimited(text: &str, sample_rate: f64) -> Result<Recording, TableError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty())
        .peekable();

    let delimiter = lines.peek().map_or(',', |(_, header)| detect_delimiter(header));
    let rows = lines.map(|(line, text)| {
        split_fields(text, delimiter)
            .map(|fields| (line, fields))
            .ok_or(TableError::UnclosedQuote { line })
    });
    assemble(rows, sample_rate)
}

/// Sheet names of an `.xlsx` workbook, in workbook order.
pub fn workbook_sheets(bytes: &[u8]) -> Result<Vec<String>, TableError> {
    Ok(open_workbook(bytes)?.sheet_names())
}

/// Parse one sheet of an `.xlsx` workbook. `sheet: None` reads the first.
///
/// Row numbers in errors are spreadsheet rows. Fully empty rows are skipped.
pub fn parse_workbook(bytes: &[u8], sheet: Option<&str>, sample_rate: f64) -> Result<Recording, TableError> {
    let mut workbook = open_workbook(bytes)?;
    let available = workbook.sheet_names();
    let name = match sheet {
        Some(wanted) => available
            .iter()
            .find(|s| s.as_str() == wanted)
            .cloned()
            .ok_or_else(|| TableError::UnknownSheet {
                name: wanted.to_string(),
                available: available.clone(),
            })?,
        None => available.first().cloned().ok_or(TableError::Empty)?,
    };

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| TableError::Workbook(e.to_string()))?;
    let first_row = range.start().map_or(0, |(row, _)| row as usize);
    let rows = range
        .rows()
        .enumerate()
        .map(|(i, cells)| (first_row + i + 1, cells.iter().map(cell_text).collect::<Vec<_>>()))
        .filter(|(_, cells)| cells.iter().any(|c| !c.is_empty()))
        .map(Ok);

    log::debug!("reading sheet `{name}`");
    assemble(rows, sample_rate)
}

fn open_workbook(bytes: &[u8]) -> Result<Xlsx<Cursor<&[u8]>>, TableError> {
    Xlsx::new(Cursor::new(bytes)).map_err(|e| TableError::Workbook(e.to_string()))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

/// Shape header + rows into a recording.
fn assemble(rows: impl IntoIterator<Item = Result<Row, TableError>>, sample_rate: f64) -> Result<Recording, TableError> {
    let mut rows = rows.into_iter();
    let (_, header) = rows.next().ok_or(TableError::Empty)??;

    // Indices of columns that survive the artefact filter.
    let kept: Vec<usize> = header
        .iter()
        .enumerate()
        .filter(|(_, name)| !is_artefact_column(name))
        .map(|(i, _)| i)
        .collect();

    // First kept column is time/index.
    let channel_cols = kept.get(1..).unwrap_or(&[]);
    if channel_cols.is_empty() {
        return Err(TableError::NoChannels);
    }

    let mut channels: Vec<Channel> = channel_cols
        .iter()
        .map(|&col| Channel {
            name: header[col].clone(),
            samples: Vec::new(),
        })
        .collect();

    for row in rows {
        let (line_no, fields) = row?;
        if fields.len() != header.len() {
            return Err(TableError::RaggedRow {
                line: line_no,
                expected: header.len(),
                found: fields.len(),
            });
        }
        for (channel, &col) in channels.iter_mut().zip(channel_cols.iter()) {
            let text = &fields[col];
            match text.parse::<f64>() {
                Ok(v) if v.is_finite() => channel.samples.push(v),
                _ => {
                    return Err(TableError::BadCell {
                        line: line_no,
                        channel: channel.name.clone(),
                        text: text.clone(),
                    })
                }
            }
        }
    }

    let recording = Recording::new(sample_rate, channels)?;
    log::info!(
        "parsed {} channels x {} samples ({:.1} s at {} Hz)",
        recording.channels().len(),
        recording.len(),
        recording.duration_secs(),
        sample_rate
    );
    Ok(recording)
}

/// First of tab, `;`, `,` that appears outside quotes in the header.
fn detect_delimiter(header: &str) -> char {
    let mut in_quotes = false;
    let mut seen = [false; 3];
    for c in header.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            '\t' if !in_quotes => seen[0] = true,
            ';' if !in_quotes => seen[1] = true,
            ',' if !in_quotes => seen[2] = true,
            _ => {}
        }
    }
    ['\t', ';', ',']
        .into_iter()
        .zip(seen)
        .find(|&(_, hit)| hit)
        .map_or(',', |(d, _)| d)
}

/// Split one line into trimmed fields. Returns `None` on an unclosed quote.
fn split_fields(line: &str, delimiter: char) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
        } else if c == '"' {
            in_quotes = true;
        } else if c == delimiter {
            fields.push(field.trim().to_string());
            field.clear();
        } else {
            field.push(c);
        }
    }
    if in_quotes {
        return None;
    }
    fields.push(field.trim().to_string());
    Some(fields)
}

fn is_artefact_column(name: &str) -> bool {
    name.is_empty() || name.starts_with("Unnamed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    #[test]
    fn test_basic_csv() {
        let text = "time,Fp1,Fp2\n0.0,1.5,-2\n0.002,2.5,-3\n";
        let rec = parse_delimited(text, 512.0).unwrap();
        let names: Vec<&str> = rec.channel_names().collect();
        assert_eq!(names, vec!["Fp1", "Fp2"]);
        assert_eq!(rec.channel("Fp1").unwrap().samples, vec![1.5, 2.5]);
        assert_eq!(rec.channel("Fp2").unwrap().samples, vec![-2.0, -3.0]);
        assert_eq!(rec.sample_rate(), 512.0);
    }

    #[test]
    fn test_unnamed_and_blank_columns_dropped() {
        let text = "Unnamed: 0,time,,Cz,Unnamed: 4,Pz\n9,0,x,1,y,2\n9,1,x,3,y,4\n";
        let rec = parse_delimited(text, 256.0).unwrap();
        let names: Vec<&str> = rec.channel_names().collect();
        assert_eq!(names, vec!["Cz", "Pz"]);
        assert_eq!(rec.channel("Pz").unwrap().samples, vec![2.0, 4.0]);
    }

    #[test]
    fn test_tab_and_semicolon_with_quotes() {
        let tsv = "\"t\"\t\"O1\"\n0\t 7.25 \n";
        let rec = parse_delimited(tsv, 512.0).unwrap();
        assert_eq!(rec.channel("O1").unwrap().samples, vec![7.25]);

        let semi = "t;O1;O2\r\n0;1;2\r\n\r\n1;3;4\r\n";
        let rec = parse_delimited(semi, 512.0).unwrap();
        assert_eq!(rec.channel("O2").unwrap().samples, vec![2.0, 4.0]);
    }

    #[test]
    fn test_quoted_names_may_contain_the_delimiter() {
        let text = "time,\"Fp1, ref\",Cz\n0,1,2\n1,3,4\n";
        let rec = parse_delimited(text, 512.0).unwrap();
        let names: Vec<&str> = rec.channel_names().collect();
        assert_eq!(names, vec!["Fp1, ref", "Cz"]);
        assert_eq!(rec.channel("Fp1, ref").unwrap().samples, vec![1.0, 3.0]);

        // A comma inside quotes does not outrank a real semicolon delimiter.
        let semi = "t;\"a,b\";\"say \"\"hi\"\"\"\n0;1;2\n";
        let rec = parse_delimited(semi, 512.0).unwrap();
        let names: Vec<&str> = rec.channel_names().collect();
        assert_eq!(names, vec!["a,b", "say \"hi\""]);
    }

    #[test]
    fn test_unclosed_quote_reports_line() {
        assert_eq!(
            parse_delimited("time,Fz\n0,\"1\n", 512.0),
            Err(TableError::UnclosedQuote { line: 2 })
        );
        assert_eq!(
            parse_delimited("time,\"Fz\n0,1\n", 512.0),
            Err(TableError::UnclosedQuote { line: 1 })
        );
    }

    #[test]
    fn test_split_and_detect() {
        assert_eq!(split_fields(" a , \"b\" ,", ','), Some(vec!["a".into(), "b".into(), String::new()]));
        assert_eq!(split_fields("\"x", ','), None);
        assert_eq!(detect_delimiter("\"a;b\",c"), ',');
        assert_eq!(detect_delimiter("a\tb;c"), '\t');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_header_only_gives_empty_channels() {
        let rec = parse_delimited("time,Fz\n", 512.0).unwrap();
        assert!(rec.is_empty());
        assert_eq!(rec.channels().len(), 1);
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_delimited("", 512.0), Err(TableError::Empty));
        assert_eq!(parse_delimited("\n  \n", 512.0), Err(TableError::Empty));
        assert_eq!(parse_delimited("time\n0\n", 512.0), Err(TableError::NoChannels));
        assert_eq!(
            parse_delimited("time,Fz,Fz\n0,1,2\n", 512.0),
            Err(TableError::DuplicateChannel("Fz".into()))
        );
        assert_eq!(
            parse_delimited("time,Fz\n0,1\n1\n", 512.0),
            Err(TableError::RaggedRow { line: 3, expected: 2, found: 1 })
        );
        assert_eq!(
            parse_delimited("time,Fz\n0,abc\n", 512.0),
            Err(TableError::BadCell {
                line: 2,
                channel: "Fz".into(),
                text: "abc".into()
            })
        );
        assert!(matches!(
            parse_delimited("time,Fz\n0,NaN\n", 512.0),
            Err(TableError::BadCell { .. })
        ));
        assert_eq!(
            parse_delimited("time,Fz\n0,1\n", -5.0),
            Err(TableError::InvalidSampleRate(-5.0))
        );
    }

    #[test]
    fn test_time_column_cells_are_not_parsed() {
        let text = "time,Fz\n00:00:00.000,1\n00:00:00.002,2\n";
        let rec = parse_delimited(text, 500.0).unwrap();
        assert_eq!(rec.channel("Fz").unwrap().samples, vec![1.0, 2.0]);
    }

    /// Write `rows` under `header` into a new sheet. Empty header names are left blank.
    fn add_sheet(wb: &mut Workbook, name: &str, header: &[&str], rows: &[Vec<f64>]) {
        let ws = wb.add_worksheet();
        ws.set_name(name).unwrap();
        for (c, h) in header.iter().enumerate() {
            if !h.is_empty() {
                ws.write_string(0, c as u16, *h).unwrap();
            }
        }
        for (r, row) in rows.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                ws.write_number(r as u32 + 1, c as u16, *v).unwrap();
            }
        }
    }

    /// Eyes-closed and eyes-open baselines, as two sheets of one export.
    fn baseline_workbook() -> Vec<u8> {
        let mut wb = Workbook::new();
        add_sheet(
            &mut wb,
            "ECBL",
            &["Unnamed: 0", "time", "Fz", "", "Cz"],
            &[
                vec![0.0, 0.0, 1.5, 9.0, -1.0],
                vec![1.0, 0.002, 2.5, 9.0, -2.0],
                vec![2.0, 0.004, 3.5, 9.0, -3.0],
            ],
        );
        add_sheet(&mut wb, "EOBL", &["time", "O1"], &[vec![0.0, 4.0], vec![0.002, 5.0]]);
        wb.save_to_buffer().unwrap()
    }

    #[test]
    fn test_workbook_sheet_names() {
        let bytes = baseline_workbook();
        assert_eq!(workbook_sheets(&bytes).unwrap(), vec!["ECBL", "EOBL"]);
    }

    #[test]
    fn test_workbook_first_sheet_by_default() {
        let bytes = baseline_workbook();
        let rec = parse_workbook(&bytes, None, 512.0).unwrap();
        let names: Vec<&str> = rec.channel_names().collect();
        assert_eq!(names, vec!["Fz", "Cz"]);
        assert_eq!(rec.channel("Fz").unwrap().samples, vec![1.5, 2.5, 3.5]);
        assert_eq!(rec.channel("Cz").unwrap().samples, vec![-1.0, -2.0, -3.0]);
    }

    #[test]
    fn test_workbook_named_sheet() {
        let bytes = baseline_workbook();
        let rec = parse_workbook(&bytes, Some("EOBL"), 256.0).unwrap();
        let names: Vec<&str> = rec.channel_names().collect();
        assert_eq!(names, vec!["O1"]);
        assert_eq!(rec.channel("O1").unwrap().samples, vec![4.0, 5.0]);
        assert_eq!(rec.sample_rate(), 256.0);
    }

    #[test]
    fn test_workbook_errors() {
        let bytes = baseline_workbook();
        assert_eq!(
            parse_workbook(&bytes, Some("Sheet9"), 512.0),
            Err(TableError::UnknownSheet {
                name: "Sheet9".into(),
                available: vec!["ECBL".into(), "EOBL".into()],
            })
        );
        assert!(matches!(
            parse_workbook(b"time,Fz\n0,1\n", None, 512.0),
            Err(TableError::Workbook(_))
        ));

        let mut wb = Workbook::new();
        add_sheet(&mut wb, "Data", &["time", "Fz"], &[vec![0.0, 1.0]]);
        let ws = wb.worksheet_from_name("Data").unwrap();
        ws.write_string(2, 0, "0.004").unwrap();
        ws.write_string(2, 1, "n/a").unwrap();
        let bytes = wb.save_to_buffer().unwrap();
        assert_eq!(
            parse_workbook(&bytes, None, 512.0),
            Err(TableError::BadCell {
                line: 3,
                channel: "Fz".into(),
                text: "n/a".into()
            })
        );
    }

    #[test]
    fn test_load_recording_routes_both_formats() {
        let rec = load_recording(TableSource::Delimited("time,Fz\n0,1\n"), 512.0).unwrap();
        assert_eq!(rec.channel("Fz").unwrap().samples, vec![1.0]);

        let bytes = baseline_workbook();
        let source = TableSource::Workbook {
            bytes: &bytes,
            sheet: Some("EOBL"),
        };
        assert_eq!(load_recording(source, 512.0).unwrap().channels().len(), 1);

        let missing = TableSource::Workbook {
            bytes: &bytes,
            sheet: Some("nope"),
        };
        assert!(matches!(
            load_recording(missing, 512.0),
            Err(Error::Table(TableError::UnknownSheet { .. }))
        ));
        assert!(matches!(
            load_recording(TableSource::Delimited(""), 512.0),
            Err(Error::Table(TableError::Empty))
        ));
    }

    #[test]
    fn test_workbook_file_names() {
        assert!(is_workbook_name("baseline.xlsx"));
        assert!(is_workbook_name("BASELINE.XLSX"));
        assert!(!is_workbook_name("baseline.csv"));
        assert!(!is_workbook_name("xlsx"));
    }
}
