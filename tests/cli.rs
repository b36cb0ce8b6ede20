use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

const EXPENSES_HEADER: &str = "Fecha,Comprobante,Proveedor - Concepto,Neto s/imp.,Neto c/imp.,Total c/IVA";
const VAT_HEADER: &str =
    "Fecha,Comprobante,Proveedor,Tipo/Nro.Doc.,Neto,IVA,Sin créd.fis.,No Gravado,Ret./Per.,Exentas,Total";

fn vatmatch(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("vatmatch").unwrap();
    cmd.env("HOME", home).env_remove("RUST_LOG");
    cmd
}

fn write_ledger(dir: &Path, name: &str, preamble: usize, header: &str, rows: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut content = String::new();
    for i in 0..preamble {
        content.push_str(&format!("Listado linea {i}\n"));
    }
    content.push_str(header);
    content.push('\n');
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    std::fs::write(&path, content).unwrap();
    path
}

fn fixtures(dir: &Path) -> (PathBuf, PathBuf) {
    let expenses = write_ledger(dir, "gastos.csv", 10, EXPENSES_HEADER, &[
        "2024-01-15,A - 001,Librería Sur,100,121,121",
        "varios,B002,Ajuste,0,0,0",
        "16/01/2024,C-003,Ferretería,50,60.5,60.5",
        "Total del concepto: 181.50,,,150,181.5,181.5",
    ]);
    let vat = write_ledger(dir, "iva.csv", 7, VAT_HEADER, &[
        "2024-01-15,A001,Librería Sur,FC A,100,21,0,0,0,0,121",
        "2024-01-20,B 002,Ajuste,FC B,0,0,0,0,0,0,0",
        "2024-01-22,Z999,Otro,FC A,10,2.1,0,0,0,0,12.1",
    ]);
    (expenses, vat)
}

fn last_column(path: &Path) -> Vec<String> {
    let mut rdr = csv::Reader::from_path(path).unwrap();
    rdr.records()
        .map(|r| r.unwrap().iter().last().unwrap().to_string())
        .collect()
}

#[test]
fn test_run_writes_csv_pair() {
    let home = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let (expenses, vat) = fixtures(work.path());
    let out = work.path().join("gastos_iva.csv");

    vatmatch(home.path())
        .args(["run", "--quiet", "--expenses"])
        .arg(&expenses)
        .arg("--vat")
        .arg(&vat)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"))
        .stdout(predicate::str::contains("1 subtotal rows dropped"));

    let expense_flags = last_column(&work.path().join("gastos_iva-expenses.csv"));
    assert_eq!(expense_flags, vec!["Sí", "", "No"]);
    let vat_flags = last_column(&work.path().join("gastos_iva-vat.csv"));
    assert_eq!(vat_flags, vec!["Sí", "Sí", "No"]);
}

#[test]
fn test_run_keeps_all_digit_vouchers() {
    let home = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let expenses = write_ledger(work.path(), "gastos.csv", 10, EXPENSES_HEADER, &[
        "2024-03-01,00001234,Librería Sur,100,121,121",
        "2024-03-02,0042,Ferretería,50,60.5,60.5",
    ]);
    let vat = write_ledger(work.path(), "iva.csv", 7, VAT_HEADER, &[
        "2024-03-01,0000-1234,Librería Sur,0001,100,21,0,0,0,0,121",
        "2024-03-05,42,Ferretería,0002,50,10.5,0,0,0,0,60.5",
    ]);
    let out = work.path().join("out.csv");

    vatmatch(home.path())
        .args(["run", "--quiet", "--expenses"])
        .arg(&expenses)
        .arg("--vat")
        .arg(&vat)
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let expenses_out = work.path().join("out-expenses.csv");
    let vat_out = work.path().join("out-vat.csv");
    assert_eq!(last_column(&expenses_out), vec!["Sí", "No"]);
    assert_eq!(last_column(&vat_out), vec!["Sí", "No"]);

    let mut rdr = csv::Reader::from_path(&vat_out).unwrap();
    let first = rdr.records().next().unwrap().unwrap();
    assert_eq!(&first[1], "00001234");
    assert_eq!(&first[3], "0001");
    let mut rdr = csv::Reader::from_path(&expenses_out).unwrap();
    let vouchers: Vec<String> = rdr.records().map(|r| r.unwrap()[1].to_string()).collect();
    assert_eq!(vouchers, vec!["00001234", "0042"]);
}

#[test]
fn test_run_is_deterministic() {
    let home = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let (expenses, vat) = fixtures(work.path());
    let mut outputs = Vec::new();
    for name in ["first.csv", "second.csv"] {
        let out = work.path().join(name);
        vatmatch(home.path())
            .args(["run", "-q", "--expenses"])
            .arg(&expenses)
            .arg("--vat")
            .arg(&vat)
            .arg("-o")
            .arg(&out)
            .assert()
            .success();
        let stem = name.trim_end_matches(".csv");
        outputs.push((
            std::fs::read(work.path().join(format!("{stem}-expenses.csv"))).unwrap(),
            std::fs::read(work.path().join(format!("{stem}-vat.csv"))).unwrap(),
        ));
    }
    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn test_run_uses_saved_settings() {
    let home = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let (expenses, vat) = fixtures(work.path());
    let out = work.path().join("saved.csv");

    for (key, value) in [
        ("expenses_path", expenses.to_str().unwrap()),
        ("vat_path", vat.to_str().unwrap()),
        ("output_path", out.to_str().unwrap()),
        ("vat_sheet_name", "iva"),
    ] {
        vatmatch(home.path()).args(["settings", "set", key, value]).assert().success();
    }

    vatmatch(home.path())
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vat_sheet_name"))
        .stdout(predicate::str::contains("iva"));

    vatmatch(home.path())
        .args(["run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("First rows of expenses"));
    assert!(work.path().join("saved-iva.csv").exists());
    assert!(work.path().join("saved-expenses.csv").exists());
}

#[test]
fn test_settings_rejects_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    vatmatch(home.path())
        .args(["settings", "set", "colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Unknown setting: colour"));
}

#[test]
fn test_missing_input_fails_without_output() {
    let home = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let (_, vat) = fixtures(work.path());
    let out = work.path().join("out.xlsx");

    vatmatch(home.path())
        .args(["run", "--expenses"])
        .arg(work.path().join("missing.xlsx"))
        .arg("--vat")
        .arg(&vat)
        .arg("--output")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Cannot load"));
    assert!(!out.exists());
}

#[test]
fn test_wrong_header_offset_is_reported() {
    let home = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let (expenses, vat) = fixtures(work.path());

    vatmatch(home.path())
        .args(["run", "--expenses-header", "3", "--expenses"])
        .arg(&expenses)
        .arg("--vat")
        .arg(&vat)
        .arg("--output")
        .arg(work.path().join("out.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unexpected layout"));
    assert!(!work.path().join("out-expenses.csv").exists());
}

#[test]
fn test_preview_prints_rows() {
    let home = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let (_, vat) = fixtures(work.path());

    vatmatch(home.path())
        .args(["preview", "--kind", "vat", "--rows", "1"])
        .arg(&vat)
        .assert()
        .success()
        .stdout(predicate::str::contains("A001"))
        .stdout(predicate::str::contains("Z999").not());
}

#[test]
fn test_run_xlsx_roundtrip() {
    use calamine::{Data, Reader};
    use rust_xlsxwriter::Workbook;

    let home = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();

    let expenses = work.path().join("gastos.xlsx");
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.write_string(0, 0, "Gastos por concepto").unwrap();
    for (col, name) in EXPENSES_HEADER.split(',').enumerate() {
        ws.write_string(10, col as u16, name).unwrap();
    }
    ws.write_string(11, 0, "2024-01-15").unwrap();
    ws.write_string(11, 1, "0001 - 00000451").unwrap();
    ws.write_number(11, 5, 121.0).unwrap();
    ws.write_string(12, 0, "Total del concepto: 121").unwrap();
    ws.write_number(12, 5, 121.0).unwrap();
    wb.save(&expenses).unwrap();

    let vat = work.path().join("iva-compras.xlsx");
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    for (col, name) in VAT_HEADER.split(',').enumerate() {
        ws.write_string(7, col as u16, name).unwrap();
    }
    ws.write_string(8, 0, "15/01/2024").unwrap();
    ws.write_string(8, 1, "000100000451").unwrap();
    ws.write_number(8, 10, 121.0).unwrap();
    wb.save(&vat).unwrap();

    let out = work.path().join("gastos_iva.xlsx");
    vatmatch(home.path())
        .args(["run", "-q", "--expenses"])
        .arg(&expenses)
        .arg("--vat")
        .arg(&vat)
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let mut book = calamine::open_workbook_auto(&out).unwrap();
    assert_eq!(book.sheet_names().to_vec(), vec!["expenses".to_string(), "vat".to_string()]);
    let sheet = book.worksheet_range("expenses").unwrap();
    assert_eq!(sheet.height(), 2);
    assert_eq!(sheet.get_value((1, 1)), Some(&Data::String("000100000451".into())));
    assert_eq!(sheet.get_value((1, 6)), Some(&Data::String("Sí".into())));
    let sheet = book.worksheet_range("vat").unwrap();
    assert_eq!(sheet.get_value((1, 11)), Some(&Data::String("Sí".into())));
}
