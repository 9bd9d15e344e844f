use std::collections::{HashMap, HashSet};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use calamine::{Data, DataType, Reader, open_workbook_auto};
use thiserror::Error;

use crate::forms::coupons::EXPIRY_DATE_FORMAT;

/// Columns of coupon exports, also required verbatim for imports.
pub const COUPON_HEADERS: [&str; 8] = [
    "store_name",
    "title",
    "code",
    "description",
    "category",
    "expiry_date",
    "featured",
    "logo_url",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Csv,
    Xlsx,
}

impl TryFrom<&str> for UploadFormat {
    type Error = UploadParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(UploadParseError::InvalidFormat(other.to_string())),
        }
    }
}

#[derive(MultipartForm)]
pub struct UploadImportForm {
    #[multipart(limit = "10MB")]
    pub file: TempFile,
    pub format: Text<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUploadRow {
    /// 1-based spreadsheet row, counting the header as row 1.
    pub row_number: usize,
    pub values: HashMap<String, String>,
}

impl ParsedUploadRow {
    /// Trimmed cell value, empty when the column is absent.
    pub fn get(&self, column: &str) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUpload {
    pub format: UploadFormat,
    pub headers: Vec<String>,
    pub rows: Vec<ParsedUploadRow>,
}

#[derive(Debug, Error)]
pub enum UploadParseError {
    #[error("invalid upload format: {0}")]
    InvalidFormat(String),
    #[error("uploaded file is missing")]
    MissingFile,
    #[error("uploaded file extension does not match selected format")]
    ExtensionMismatch,
    #[error("uploaded file content type does not match selected format")]
    ContentTypeMismatch,
    #[error("failed to read uploaded file")]
    ReadFailed,
    #[error("failed to parse CSV")]
    CsvParseFailed,
    #[error("failed to parse XLSX")]
    XlsxParseFailed,
    #[error("uploaded file has no worksheet")]
    XlsxMissingSheet,
    #[error("header validation failed: {0}")]
    HeaderValidation(String),
}

impl From<std::io::Error> for UploadParseError {
    fn from(_: std::io::Error) -> Self {
        Self::ReadFailed
    }
}

impl From<csv::Error> for UploadParseError {
    fn from(_: csv::Error) -> Self {
        Self::CsvParseFailed
    }
}

impl From<calamine::Error> for UploadParseError {
    fn from(_: calamine::Error) -> Self {
        Self::XlsxParseFailed
    }
}

pub fn parse_upload(form: &mut UploadImportForm) -> Result<ParsedUpload, UploadParseError> {
    let format = UploadFormat::try_from(form.format.as_str())?;

    validate_file_meta(form, format)?;

    let (headers, rows) = match format {
        UploadFormat::Csv => parse_csv_rows(form)?,
        UploadFormat::Xlsx => read_xlsx_rows(form.file.file.path())?,
    };

    build_upload(format, headers, rows)
}

/// Validate the header row and key every data row by column name.
pub fn build_upload(
    format: UploadFormat,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> Result<ParsedUpload, UploadParseError> {
    let normalized_headers = normalize_headers(headers)?;
    validate_headers(&normalized_headers)?;

    Ok(ParsedUpload {
        format,
        rows: rows_to_maps(&normalized_headers, rows),
        headers: normalized_headers,
    })
}

fn rows_to_maps(headers: &[String], rows: Vec<Vec<String>>) -> Vec<ParsedUploadRow> {
    rows.into_iter()
        .enumerate()
        .filter(|(_, row)| row.iter().any(|cell| !cell.trim().is_empty()))
        .map(|(idx, row)| {
            let mut values = HashMap::new();
            for (col_idx, header) in headers.iter().enumerate() {
                let value = row.get(col_idx).cloned().unwrap_or_default();
                values.insert(header.clone(), value.trim().to_string());
            }
            ParsedUploadRow {
                row_number: idx + 2,
                values,
            }
        })
        .collect()
}

fn normalize_headers(headers: Vec<String>) -> Result<Vec<String>, UploadParseError> {
    let normalized = headers
        .into_iter()
        .map(|header| header.trim().to_ascii_lowercase())
        .collect::<Vec<_>>();

    if normalized.is_empty() {
        return Err(UploadParseError::HeaderValidation(
            "missing header row".to_string(),
        ));
    }

    if normalized.iter().any(|header| header.is_empty()) {
        return Err(UploadParseError::HeaderValidation(
            "header contains empty column name".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for header in &normalized {
        if !seen.insert(header.clone()) {
            return Err(UploadParseError::HeaderValidation(format!(
                "duplicate header column: {header}"
            )));
        }
    }

    Ok(normalized)
}

fn validate_headers(headers: &[String]) -> Result<(), UploadParseError> {
    let expected_set = COUPON_HEADERS.iter().copied().collect::<HashSet<_>>();
    let header_set = headers.iter().map(String::as_str).collect::<HashSet<_>>();

    if header_set != expected_set {
        return Err(UploadParseError::HeaderValidation(format!(
            "import requires exact headers: {}",
            COUPON_HEADERS.join(",")
        )));
    }

    Ok(())
}

fn validate_file_meta(
    form: &UploadImportForm,
    format: UploadFormat,
) -> Result<(), UploadParseError> {
    let Some(file_name) = form.file.file_name.as_ref() else {
        return Err(UploadParseError::MissingFile);
    };

    let extension_ok = match format {
        UploadFormat::Csv => file_name.to_ascii_lowercase().ends_with(".csv"),
        UploadFormat::Xlsx => file_name.to_ascii_lowercase().ends_with(".xlsx"),
    };

    if !extension_ok {
        return Err(UploadParseError::ExtensionMismatch);
    }

    if let Some(content_type) = form.file.content_type.as_ref() {
        let mime = content_type.essence_str();
        let content_type_ok = match format {
            UploadFormat::Csv => matches!(
                mime,
                "text/csv" | "application/csv" | "application/vnd.ms-excel" | "text/plain"
            ),
            UploadFormat::Xlsx => {
                mime == "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        };

        if !content_type_ok {
            return Err(UploadParseError::ContentTypeMismatch);
        }
    }

    Ok(())
}

fn parse_csv_rows(
    form: &mut UploadImportForm,
) -> Result<(Vec<String>, Vec<Vec<String>>), UploadParseError> {
    let file = form.file.file.as_file_mut();
    file.seek(SeekFrom::Start(0))?;

    let mut content = String::new();
    file.read_to_string(&mut content)?;

    parse_csv_content(&content)
}

pub fn parse_csv_content(content: &str) -> Result<(Vec<String>, Vec<Vec<String>>), UploadParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::None)
        .from_reader(content.trim_start_matches('\u{feff}').as_bytes());

    let headers = reader
        .headers()?
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    Ok((headers, rows))
}

fn read_xlsx_rows(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>), UploadParseError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(UploadParseError::XlsxMissingSheet)??;

    let mut iter = range.rows();
    let Some(header_row) = iter.next() else {
        return Err(UploadParseError::HeaderValidation(
            "missing header row".to_string(),
        ));
    };

    let headers = header_row.iter().map(cell_to_string).collect::<Vec<_>>();

    let mut rows = Vec::new();
    for row in iter {
        rows.push(row.iter().map(cell_to_string).collect::<Vec<_>>());
    }

    Ok((headers, rows))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        // Date cells hold an Excel serial number.
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_date()
            .map(|date| date.format(EXPIRY_DATE_FORMAT).to_string())
            .unwrap_or_else(|| cell.to_string()),
        _ => cell.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn accepts_exact_headers_in_any_order() {
        let mut shuffled = COUPON_HEADERS.to_vec();
        shuffled.reverse();
        assert!(validate_headers(&headers(&shuffled)).is_ok());
    }

    #[test]
    fn rejects_missing_column() {
        let err = validate_headers(&headers(&COUPON_HEADERS[..7]))
            .unwrap_err()
            .to_string();
        assert!(err.contains("exact headers"));
    }

    #[test]
    fn rejects_duplicate_headers() {
        let err = normalize_headers(headers(&["code", " CODE "]))
            .unwrap_err()
            .to_string();
        assert!(err.contains("duplicate header column: code"));
    }

    #[test]
    fn parses_csv_rows_with_row_numbers_and_skips_blank_lines() {
        let content = "\u{feff}store_name,title,code,description,category,expiry_date,featured,logo_url\n\
                       Zara, 20% off ,zara20,Sitewide,Fashion,2031-01-01,true,\n\
                       ,,,,,,,\n\
                       Croma,TV deal,TV10,Big screens,Electronics,2031-02-01,false,\n";
        let (raw_headers, rows) = parse_csv_content(content).unwrap();
        let normalized = normalize_headers(raw_headers).unwrap();
        let rows = rows_to_maps(&normalized, rows);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[0].get("title"), "20% off");
        assert_eq!(rows[1].row_number, 4);
        assert_eq!(rows[1].get("store_name"), "Croma");
    }

    #[test]
    fn reads_date_cells_as_iso_dates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coupons.xlsx");

        let mut workbook = rust_xlsxwriter::Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, "code").unwrap();
        worksheet.write_string(0, 1, "expiry_date").unwrap();
        worksheet.write_string(1, 0, "ZARA20").unwrap();
        let date = rust_xlsxwriter::ExcelDateTime::from_ymd(2031, 12, 31).unwrap();
        let date_format = rust_xlsxwriter::Format::new().set_num_format("yyyy-mm-dd");
        worksheet
            .write_datetime_with_format(1, 1, &date, &date_format)
            .unwrap();
        workbook.save(&path).unwrap();

        let (raw_headers, rows) = read_xlsx_rows(&path).unwrap();

        assert_eq!(raw_headers, headers(&["code", "expiry_date"]));
        assert_eq!(rows, vec![headers(&["ZARA20", "2031-12-31"])]);
    }
}
