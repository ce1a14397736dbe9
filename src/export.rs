//! Excel export functionality.

use crate::models::attendance::{AttendanceRecord, CLOCK_FORMAT};
use crate::report::EmployeeSummary;
use chrono::Local;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, XlsxError};
use std::path::Path;

/// Export attendance records to Excel file.
/// One row per clock-in/clock-out entry.
pub fn export_records_to_excel(data: &[AttendanceRecord], path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    worksheet.set_name("Attendance")?;

    // Header format
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x4472C4))
        .set_font_color(Color::White)
        .set_border(FormatBorder::Thin);

    // Number format for hours
    let hours_format = Format::new().set_num_format("0.00");

    // Headers
    let headers = [
        "Employee ID",
        "Employee Name",
        "Date",
        "Time In",
        "Time Out",
        "Total Hours",
        "Note",
    ];

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    // Column widths
    worksheet.set_column_width(0, 15)?; // Employee ID
    worksheet.set_column_width(1, 30)?; // Employee Name
    worksheet.set_column_width(2, 12)?; // Date
    worksheet.set_column_width(3, 10)?; // Time In
    worksheet.set_column_width(4, 10)?; // Time Out
    worksheet.set_column_width(5, 12)?; // Total Hours
    worksheet.set_column_width(6, 30)?; // Note

    // Data rows
    for (idx, record) in data.iter().enumerate() {
        let row = (idx + 1) as u32;

        worksheet.write_string(row, 0, record.employee_id.as_deref().unwrap_or(""))?;
        worksheet.write_string(row, 1, &record.employee_name)?;
        worksheet.write_string(row, 2, record.date.to_string())?;
        worksheet.write_string(row, 3, record.time_in.format(CLOCK_FORMAT).to_string())?;
        worksheet.write_string(row, 4, record.time_out.format(CLOCK_FORMAT).to_string())?;
        worksheet.write_number_with_format(row, 5, record.total_hours, &hours_format)?;
        worksheet.write_string(row, 6, &record.note)?;
    }

    // Autofilter
    if !data.is_empty() {
        let last_row = data.len() as u32;
        worksheet.autofilter(0, 0, last_row, 6)?;
    }

    // Freeze top row
    worksheet.set_freeze_panes(1, 0)?;

    workbook.save(path)?;
    Ok(())
}

/// Export the per-employee summary to Excel file.
/// Shows total hours and days worked per employee.
pub fn export_summary_to_excel(data: &[EmployeeSummary], path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    worksheet.set_name("Summary")?;

    // Header format
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x4472C4))
        .set_font_color(Color::White)
        .set_border(FormatBorder::Thin);

    // Number format for hours
    let hours_format = Format::new().set_num_format("0.00");

    // Headers
    let headers = ["Employee Name", "Total Hours", "Days Worked"];

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    // Column widths
    worksheet.set_column_width(0, 30)?; // Employee Name
    worksheet.set_column_width(1, 12)?; // Total Hours
    worksheet.set_column_width(2, 12)?; // Days Worked

    // Data rows
    for (idx, summary) in data.iter().enumerate() {
        let row = (idx + 1) as u32;

        worksheet.write_string(row, 0, &summary.employee)?;
        worksheet.write_number_with_format(row, 1, summary.total_hours, &hours_format)?;
        worksheet.write_number(row, 2, summary.days as f64)?;
    }

    // Autofilter
    if !data.is_empty() {
        let last_row = data.len() as u32;
        worksheet.autofilter(0, 0, last_row, 2)?;
    }

    // Freeze top row
    worksheet.set_freeze_panes(1, 0)?;

    workbook.save(path)?;
    Ok(())
}

/// Generate default filename for export.
pub fn generate_export_filename(prefix: &str) -> String {
    let now = Local::now();
    format!("{prefix}_{ts}.xlsx", ts = now.format("%Y%m%d_%H%M%S"))
}
