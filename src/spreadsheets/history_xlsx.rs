use crate::domain::history::CompetitorHistoryEntry;
use crate::domain::snapshot::SnapshotSummary;
use crate::errors::ServerError;
use crate::responses::xlsx_response;
use crate::responses::ResultResp;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

const HISTORY_HEADERS: [&str; 6] = ["Competitor ID", "Competitor", "Recorded At (UTC)", "Price", "Rating", "Reviews"];
const SNAPSHOT_HEADERS: [&str; 6] = [
    "Captured At (UTC)",
    "Current",
    "Competitors",
    "Avg Price",
    "Avg Rating",
    "Suggested Price",
];

fn xlsx_err(what: &'static str) -> impl Fn(XlsxError) -> ServerError {
    move |e| ServerError::XlsxError(format!("Failed to write {what}: {e}"))
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str], bold: &Format) -> Result<(), ServerError> {
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, bold)
            .map_err(xlsx_err("header"))?;
    }
    Ok(())
}

fn write_opt_number(sheet: &mut Worksheet, row: u32, col: u16, value: Option<f64>) -> Result<(), ServerError> {
    match value {
        Some(v) => sheet.write_number(row, col, v).map_err(xlsx_err("number"))?,
        None => sheet.write_string(row, col, "").map_err(xlsx_err("blank"))?,
    };
    Ok(())
}

/// Two sheets: per-competitor price/rating history and the snapshot timeline.
pub fn build_history_workbook(
    snapshots: &[SnapshotSummary],
    history: &[CompetitorHistoryEntry],
) -> Result<Vec<u8>, ServerError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Competitors").map_err(xlsx_err("sheet name"))?;
    write_headers(sheet, &HISTORY_HEADERS, &bold)?;

    for (i, entry) in history.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet
            .write_string(r, 0, &entry.competitor_id)
            .map_err(xlsx_err("competitor id"))?;
        sheet
            .write_string(r, 1, &entry.competitor_name)
            .map_err(xlsx_err("competitor name"))?;
        sheet
            .write_string(r, 2, entry.recorded_at.format("%Y-%m-%d %H:%M").to_string())
            .map_err(xlsx_err("recorded at"))?;
        write_opt_number(sheet, r, 3, entry.price)?;
        write_opt_number(sheet, r, 4, entry.rating)?;
        sheet
            .write_number(r, 5, entry.review_count as f64)
            .map_err(xlsx_err("review count"))?;
    }

    let sheet = workbook.add_worksheet();
    sheet.set_name("Snapshots").map_err(xlsx_err("sheet name"))?;
    write_headers(sheet, &SNAPSHOT_HEADERS, &bold)?;

    for (i, s) in snapshots.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet
            .write_string(r, 0, s.captured_at.format("%Y-%m-%d %H:%M").to_string())
            .map_err(xlsx_err("captured at"))?;
        sheet
            .write_string(r, 1, if s.is_current { "Yes" } else { "No" })
            .map_err(xlsx_err("current flag"))?;
        sheet
            .write_number(r, 2, s.competitor_count as f64)
            .map_err(xlsx_err("competitor count"))?;
        sheet
            .write_number(r, 3, s.price_avg)
            .map_err(xlsx_err("average price"))?;
        sheet
            .write_number(r, 4, s.rating_avg)
            .map_err(xlsx_err("average rating"))?;
        write_opt_number(sheet, r, 5, s.suggested_price)?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| ServerError::XlsxError(format!("Failed to save workbook: {e}")))
}

pub fn export_history_xlsx(
    listing_id: &str,
    snapshots: &[SnapshotSummary],
    history: &[CompetitorHistoryEntry],
) -> ResultResp {
    let buffer = build_history_workbook(snapshots, history)?;
    xlsx_response(buffer, &format!("history_{listing_id}.xlsx"))
}
