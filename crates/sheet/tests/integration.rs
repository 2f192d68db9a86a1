use cardgrid_sheet::{
    export_file_name, read_matrix, read_matrix_from_path, save_table, table_to_csv, Column,
    CsvExportOptions, CsvOptions, Delimiter, SheetError, SourceFormat, Table, Workbook,
    PREVIEW_COLS, PREVIEW_ROWS,
};
use rust_xlsxwriter::Workbook as XlsxWriter;
use std::path::Path;
use tempfile::tempdir;

fn row(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

fn products() -> Table {
    Table::new(
        vec![
            Column::named("SKU", 0),
            Column::named("Name", 1),
            Column::generated(2),
        ],
        vec![row(&["A1", "Widget", "x"]), row(&["B2", "Gadget, large", ""])],
    )
}

// ===== Table Tests =====

#[test]
fn test_table_json_shape() {
    let json = serde_json::to_value(products()).unwrap();

    assert_eq!(json["headers"], serde_json::json!(["SKU", "Name", "Column 3"]));
    assert_eq!(json["rows"][1]["Name"], "Gadget, large");
    assert_eq!(json["rows"][1]["Column 3"], "");
}

#[test]
fn test_edit_then_export() {
    let table = products();
    let edited = table.with_value(1, "Column 3", "blue").unwrap();

    let csv = table_to_csv(&edited, &CsvExportOptions::default().with_bom(false)).unwrap();
    assert_eq!(csv, "SKU;Name;Column 3\r\nA1;Widget;x\r\nB2;Gadget, large;blue\r\n");

    // the source table is untouched
    assert_eq!(table.value(1, "Column 3").unwrap(), "");
}

#[test]
fn test_preview_defaults_cover_small_tables() {
    let table = products();
    let preview = table.preview(PREVIEW_ROWS, PREVIEW_COLS);
    assert_eq!(preview, table);
}

// ===== CSV Tests =====

#[test]
fn test_export_round_trip_each_delimiter() {
    let table = Table::from_headers(
        vec!["SKU", "Name", "Price"],
        vec![row(&["A1", "Widget", "9.99"]), row(&["B2", "Gadget", "5"])],
    );

    for delimiter in [Delimiter::Semicolon, Delimiter::Comma, Delimiter::Tab] {
        let options = CsvExportOptions::default().with_delimiter(delimiter);
        let csv = table_to_csv(&table, &options).unwrap();
        let matrix = read_matrix(&csv, &CsvOptions::default()).unwrap();

        assert_eq!(matrix.row_count(), 3, "{delimiter:?}");
        assert_eq!(matrix.row(0).unwrap(), &row(&["SKU", "Name", "Price"])[..]);
        assert_eq!(matrix.row(2).unwrap(), &row(&["B2", "Gadget", "5"])[..]);
    }
}

#[test]
fn test_save_to_export_name() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("wb_cards.xlsx");
    let target = export_file_name(&source);
    assert_eq!(target.file_name().unwrap(), "wb_cards.export.csv");

    save_table(&products(), &target, &CsvExportOptions::default()).unwrap();
    let matrix = read_matrix_from_path(&target, &CsvOptions::default()).unwrap();
    assert_eq!(matrix.cell(2, 1), "Gadget, large");
}

#[test]
fn test_windows_1251_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("legacy.csv");
    let (encoded, _, _) =
        encoding_rs::WINDOWS_1251.encode("Артикул;Бренд;Цена\r\nA1;Акме;100\r\n");
    std::fs::write(&path, &encoded).unwrap();

    let matrix = read_matrix_from_path(&path, &CsvOptions::default()).unwrap();
    assert_eq!(matrix.row(0).unwrap(), &row(&["Артикул", "Бренд", "Цена"])[..]);
    assert_eq!(matrix.cell(1, 1), "Акме");
}

#[test]
fn test_missing_file_is_an_io_error() {
    let err = read_matrix_from_path(Path::new("/nonexistent/cards.csv"), &CsvOptions::default())
        .unwrap_err();
    assert!(matches!(err, SheetError::Io(_)));
}

// ===== Workbook Tests =====

#[test]
fn test_workbook_cells_as_text() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cells.xlsx");

    let mut book = XlsxWriter::new();
    let sheet = book.add_worksheet();
    sheet.write_string(0, 0, "SKU").unwrap();
    sheet.write_string(0, 1, "In stock").unwrap();
    sheet.write_string(0, 2, "Count").unwrap();
    sheet.write_string(1, 0, "A1").unwrap();
    sheet.write_boolean(1, 1, true).unwrap();
    sheet.write_number(1, 2, 3.0).unwrap();
    book.save(&path).unwrap();

    assert_eq!(SourceFormat::from_path(&path).unwrap(), SourceFormat::Workbook);

    let mut workbook = Workbook::open(&path).unwrap();
    let matrix = workbook.read_matrix(0).unwrap();
    assert_eq!(matrix.row(1).unwrap(), &row(&["A1", "true", "3"])[..]);
}
