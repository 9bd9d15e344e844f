use serde::Serialize;
use thiserror::Error;

use crate::auth::AdminUser;
use crate::domain::coupon::Coupon;
use crate::forms::coupons::{CouponForm, CouponFormPayload, EXPIRY_DATE_FORMAT};
use crate::forms::import_export::{
    COUPON_HEADERS, ParsedUpload, ParsedUploadRow, UploadImportForm, parse_upload,
};
use crate::repository::{CouponListQuery, CouponReader, CouponWriter};

use super::{ServiceError, ServiceResult};

/// Row-level upload error used for UI reporting.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UploadRowError {
    pub row_number: usize,
    pub code: Option<String>,
    pub message: String,
}

/// Aggregated upload outcome report.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct UploadReport {
    pub total_rows: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<UploadRowError>,
}

impl UploadReport {
    pub fn with_total(total_rows: usize) -> Self {
        Self {
            total_rows,
            ..Self::default()
        }
    }

    pub fn push_error(
        &mut self,
        row_number: usize,
        code: Option<String>,
        message: impl Into<String>,
    ) {
        self.skipped += 1;
        self.errors.push(UploadRowError {
            row_number,
            code,
            message: message.into(),
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadFormat {
    Csv,
    Xlsx,
}

impl TryFrom<&str> for DownloadFormat {
    type Error = DownloadError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(DownloadError::InvalidFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DownloadFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("invalid download format: {0}")]
    InvalidFormat(String),
    #[error("failed to render csv")]
    CsvRender,
    #[error("failed to render xlsx")]
    XlsxRender,
}

pub fn render_download_file(
    base_name: &str,
    format: DownloadFormat,
    headers: &[&str],
    rows: &[Vec<String>],
) -> Result<DownloadFile, DownloadError> {
    match format {
        DownloadFormat::Csv => {
            let mut writer = csv::Writer::from_writer(vec![]);
            writer
                .write_record(headers)
                .map_err(|_| DownloadError::CsvRender)?;
            for row in rows {
                let escaped_row: Vec<String> =
                    row.iter().map(|value| escape_csv_cell(value)).collect();
                writer
                    .write_record(&escaped_row)
                    .map_err(|_| DownloadError::CsvRender)?;
            }
            let bytes = writer.into_inner().map_err(|_| DownloadError::CsvRender)?;
            Ok(DownloadFile {
                file_name: format!("{base_name}.csv"),
                content_type: "text/csv; charset=utf-8",
                bytes,
            })
        }
        DownloadFormat::Xlsx => {
            let mut workbook = rust_xlsxwriter::Workbook::new();
            let worksheet = workbook.add_worksheet();

            for (col_idx, header) in headers.iter().enumerate() {
                worksheet
                    .write_string(0, col_idx as u16, *header)
                    .map_err(|_| DownloadError::XlsxRender)?;
            }

            for (row_idx, row) in rows.iter().enumerate() {
                let sheet_row = (row_idx + 1) as u32;
                for (col_idx, value) in row.iter().enumerate() {
                    worksheet
                        .write_string(sheet_row, col_idx as u16, value)
                        .map_err(|_| DownloadError::XlsxRender)?;
                }
            }

            let bytes = workbook
                .save_to_buffer()
                .map_err(|_| DownloadError::XlsxRender)?;
            Ok(DownloadFile {
                file_name: format!("{base_name}.xlsx"),
                content_type: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                bytes,
            })
        }
    }
}

fn escape_csv_cell(value: &str) -> String {
    match value.chars().next() {
        Some('=' | '+' | '-' | '@') => format!("'{value}"),
        _ => value.to_string(),
    }
}

/// Reverse [`escape_csv_cell`] so an unedited export imports unchanged.
fn unescape_csv_cell(value: &str) -> &str {
    match value.strip_prefix('\'') {
        Some(rest) if rest.starts_with(['=', '+', '-', '@']) => rest,
        _ => value,
    }
}

/// One export row in [`COUPON_HEADERS`] order.
fn coupon_row(coupon: &Coupon) -> Vec<String> {
    vec![
        coupon.store_name.to_string(),
        coupon.title.to_string(),
        coupon.code.to_string(),
        coupon.description.to_string(),
        coupon.category.as_str().to_string(),
        coupon.expiry_date.format(EXPIRY_DATE_FORMAT).to_string(),
        coupon.featured.to_string(),
        coupon
            .logo_url
            .as_ref()
            .map(|url| url.to_string())
            .unwrap_or_default(),
    ]
}

/// Render every coupon as a CSV or XLSX attachment.
pub fn export_coupons<R>(format: &str, _admin: &AdminUser, repo: &R) -> ServiceResult<DownloadFile>
where
    R: CouponReader,
{
    let format = DownloadFormat::try_from(format)?;

    let coupons = match repo.list_coupons(CouponListQuery::default()) {
        Ok(coupons) => coupons,
        Err(e) => {
            log::error!("Failed to list coupons for export: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let rows = coupons.iter().map(coupon_row).collect::<Vec<_>>();

    render_download_file("coupons", format, &COUPON_HEADERS, &rows).map_err(|e| {
        log::error!("Failed to render coupon export: {e}");
        match e {
            DownloadError::InvalidFormat(_) => ServiceError::Form(e.to_string()),
            _ => ServiceError::Internal,
        }
    })
}

fn parse_featured(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(format!("invalid featured value: {other}")),
    }
}

fn row_to_payload(row: &ParsedUploadRow) -> Result<CouponFormPayload, String> {
    let cell = |column: &str| unescape_csv_cell(row.get(column)).to_string();
    let featured = parse_featured(row.get("featured"))?;
    let logo_url = cell("logo_url");

    let form = CouponForm {
        store_name: cell("store_name"),
        logo_url: (!logo_url.is_empty()).then_some(logo_url),
        title: cell("title"),
        code: cell("code"),
        description: cell("description"),
        category: Some(cell("category")),
        expiry_date: cell("expiry_date"),
        featured,
    };

    CouponFormPayload::try_from(form).map_err(|e| e.to_string())
}

/// Upsert already parsed rows, matching existing coupons by store and code.
///
/// Invalid rows are reported and skipped; a repository failure aborts the
/// whole import.
pub fn import_rows<R>(
    parsed: ParsedUpload,
    admin: &AdminUser,
    repo: &R,
) -> ServiceResult<UploadReport>
where
    R: CouponReader + CouponWriter,
{
    let mut report = UploadReport::with_total(parsed.rows.len());

    for row in &parsed.rows {
        let code = Some(row.get("code").to_string()).filter(|code| !code.is_empty());

        let payload = match row_to_payload(row) {
            Ok(payload) => payload,
            Err(message) => {
                report.push_error(row.row_number, code, message);
                continue;
            }
        };

        let existing = repo
            .find_coupon_by_store_and_code(&payload.store_name, &payload.code)
            .map_err(|e| {
                log::error!("Failed to look up coupon on row {}: {e}", row.row_number);
                ServiceError::Internal
            })?;

        let coupon = payload.into_new_coupon();
        match existing {
            Some(existing) => match repo.update_coupon(existing.id, &coupon) {
                Ok(Some(_)) => report.updated += 1,
                Ok(None) => report.push_error(row.row_number, code, "coupon disappeared"),
                Err(e) => {
                    log::error!("Failed to update coupon on row {}: {e}", row.row_number);
                    return Err(ServiceError::Internal);
                }
            },
            None => match repo.create_coupon(&coupon) {
                Ok(_) => report.created += 1,
                Err(e) => {
                    log::error!("Failed to create coupon on row {}: {e}", row.row_number);
                    return Err(ServiceError::Internal);
                }
            },
        }
    }

    log::info!(
        "{} imported coupons: {} created, {} updated, {} skipped",
        admin.username,
        report.created,
        report.updated,
        report.skipped
    );

    Ok(report)
}

/// Parse an uploaded CSV/XLSX file and upsert its rows.
pub fn import_coupons<R>(
    form: &mut UploadImportForm,
    admin: &AdminUser,
    repo: &R,
) -> ServiceResult<UploadReport>
where
    R: CouponReader + CouponWriter,
{
    let parsed = parse_upload(form)?;
    import_rows(parsed, admin, repo)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::forms::import_export::{UploadFormat, build_upload, parse_csv_content};
    use crate::repository::test::TestRepository;

    fn admin() -> AdminUser {
        AdminUser {
            username: "admin".into(),
            token: "token".into(),
        }
    }

    fn row(row_number: usize, values: &[(&str, &str)]) -> ParsedUploadRow {
        let mut map = COUPON_HEADERS
            .iter()
            .map(|h| (h.to_string(), String::new()))
            .collect::<HashMap<_, _>>();
        for (key, value) in values {
            map.insert(key.to_string(), value.to_string());
        }
        ParsedUploadRow {
            row_number,
            values: map,
        }
    }

    fn valid_row(row_number: usize, store: &str, code: &str, title: &str) -> ParsedUploadRow {
        row(
            row_number,
            &[
                ("store_name", store),
                ("title", title),
                ("code", code),
                ("description", "Sitewide"),
                ("category", "Fashion"),
                ("expiry_date", "2031-01-01"),
                ("featured", "yes"),
            ],
        )
    }

    fn upload(rows: Vec<ParsedUploadRow>) -> ParsedUpload {
        ParsedUpload {
            format: UploadFormat::Csv,
            headers: COUPON_HEADERS.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    #[test]
    fn csv_export_escapes_formula_prefixed_cells() {
        let file = render_download_file(
            "coupons",
            DownloadFormat::Csv,
            &["code", "description"],
            &[vec!["=SUM(A1:A2)".to_string(), "+malicious".to_string()]],
        )
        .expect("csv render should succeed");

        let csv_output = String::from_utf8(file.bytes).expect("csv output should be utf-8");
        assert!(csv_output.contains("'=SUM(A1:A2)"));
        assert!(csv_output.contains("'+malicious"));
    }

    #[test]
    fn export_lists_coupons_with_fixed_headers() {
        let repo = TestRepository::default();
        import_rows(
            upload(vec![valid_row(2, "Zara", "zara20", "20% off")]),
            &admin(),
            &repo,
        )
        .unwrap();

        let file = export_coupons("csv", &admin(), &repo).unwrap();
        let csv_output = String::from_utf8(file.bytes).unwrap();

        assert_eq!(file.file_name, "coupons.csv");
        assert!(csv_output.starts_with(
            "store_name,title,code,description,category,expiry_date,featured,logo_url"
        ));
        assert!(csv_output.contains("Zara,20% off,ZARA20,Sitewide,Fashion,2031-01-01,true,"));
    }

    #[test]
    fn export_rejects_unknown_format() {
        let repo = TestRepository::default();
        assert!(matches!(
            export_coupons("pdf", &admin(), &repo),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn xlsx_export_produces_workbook() {
        let repo = TestRepository::default();
        let file = export_coupons("XLSX", &admin(), &repo).unwrap();
        assert_eq!(file.file_name, "coupons.xlsx");
        assert!(file.bytes.starts_with(b"PK"));
    }

    #[test]
    fn import_creates_then_updates_by_store_and_code() {
        let repo = TestRepository::default();

        let first = import_rows(
            upload(vec![valid_row(2, "Zara", "zara20", "20% off")]),
            &admin(),
            &repo,
        )
        .unwrap();
        assert_eq!((first.created, first.updated), (1, 0));

        let second = import_rows(
            upload(vec![
                valid_row(2, "Zara", "ZARA20", "25% off"),
                valid_row(3, "Croma", "TV10", "TV deal"),
            ]),
            &admin(),
            &repo,
        )
        .unwrap();
        assert_eq!((second.created, second.updated), (1, 1));

        let coupons = repo.coupons();
        assert_eq!(coupons.len(), 2);
        assert_eq!(coupons[0].title.as_str(), "25% off");
        assert!(coupons[0].featured);
    }

    #[test]
    fn unescapes_only_formula_prefixes() {
        assert_eq!(unescape_csv_cell("'-50% off"), "-50% off");
        assert_eq!(unescape_csv_cell("'=SUM(A1)"), "=SUM(A1)");
        assert_eq!(unescape_csv_cell("'quoted'"), "'quoted'");
        assert_eq!(unescape_csv_cell("plain"), "plain");
    }

    #[test]
    fn reimporting_csv_export_keeps_formula_like_values() {
        let repo = TestRepository::default();
        import_rows(
            upload(vec![valid_row(2, "+Plus Store", "SHOES50", "-50% on shoes")]),
            &admin(),
            &repo,
        )
        .unwrap();

        for _ in 0..2 {
            let file = export_coupons("csv", &admin(), &repo).unwrap();
            let content = String::from_utf8(file.bytes).unwrap();
            assert!(content.contains("'-50% on shoes"));

            let (headers, rows) = parse_csv_content(&content).unwrap();
            let parsed = build_upload(UploadFormat::Csv, headers, rows).unwrap();
            let report = import_rows(parsed, &admin(), &repo).unwrap();

            assert_eq!((report.created, report.updated), (0, 1));
            assert!(report.errors.is_empty());
        }

        let coupons = repo.coupons();
        assert_eq!(coupons.len(), 1);
        assert_eq!(coupons[0].title.as_str(), "-50% on shoes");
        assert_eq!(coupons[0].store_name.as_str(), "+Plus Store");
    }

    #[test]
    fn import_reports_invalid_rows() {
        let repo = TestRepository::default();
        let mut bad_date = valid_row(2, "Zara", "ZARA20", "20% off");
        bad_date
            .values
            .insert("expiry_date".into(), "tomorrow".into());
        let mut bad_featured = valid_row(3, "Croma", "TV10", "TV deal");
        bad_featured
            .values
            .insert("featured".into(), "maybe".into());

        let report = import_rows(upload(vec![bad_date, bad_featured]), &admin(), &repo).unwrap();

        assert_eq!(report.total_rows, 2);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.errors[0].row_number, 2);
        assert_eq!(report.errors[0].code.as_deref(), Some("ZARA20"));
        assert_eq!(report.errors[1].message, "invalid featured value: maybe");
        assert!(repo.coupons().is_empty());
    }
}
