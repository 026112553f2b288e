//! End-to-end tests against a real OpenOffice.org / LibreOffice install.
//!
//! They are gated behind the `E2E_ENABLED` environment variable so they do
//! not run in CI unless explicitly requested. Tests that use binary fixtures
//! from `./test_cases/` skip when the file is absent; the rest generate
//! their inputs on the fly.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture --test-threads=1

use office2pdf::{ConvertError, ConverterConfig, ExportProfile, OfficeConverter};
use std::path::PathBuf;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

fn output_dir() -> PathBuf {
    let d = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases/output");
    std::fs::create_dir_all(&d).ok();
    d
}

/// Skip this test if E2E_ENABLED is not set.
macro_rules! e2e_skip_unless_enabled {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    }};
}

/// Skip this test if E2E_ENABLED is not set *or* no fixture at `path`.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        e2e_skip_unless_enabled!();
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP — test file not found: {}", p.display());
            return;
        }
        p
    }};
}

fn assert_pdf(bytes: &[u8], context: &str) {
    assert!(
        bytes.starts_with(b"%PDF-"),
        "[{context}] Output is not a PDF (starts with {:?})",
        &bytes[..bytes.len().min(8)]
    );
    assert!(
        bytes.len() > 200,
        "[{context}] Output suspiciously short: {} bytes",
        bytes.len()
    );
    println!("[{context}] ✓  {} bytes", bytes.len());
}

fn converter() -> OfficeConverter {
    let mut builder = ConverterConfig::builder();
    if let Ok(path) = std::env::var("OFFICE2PDF_SOFFICE") {
        builder = builder.soffice_path(path);
    }
    OfficeConverter::new(builder.build().expect("valid config"))
}

// ── Connection ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_connect() {
    e2e_skip_unless_enabled!();

    let converter = converter();
    let name = converter.connect().await.expect("a backend should answer");
    assert!(!name.is_empty());
    assert_eq!(converter.session_generation().await, 1);
    println!("Connected to {name}");
}

// ── Generated inputs ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_convert_csv_uses_calc() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("sales.csv");
    std::fs::write(&src, "region,q1,q2\nnorth,10,12\nsouth,7,9\n").unwrap();
    let dst = output_dir().join("sales.pdf");

    let report = converter()
        .convert(&src, &dst)
        .await
        .expect("conversion should succeed");

    assert_eq!(report.profile, ExportProfile::Calc);
    assert_pdf(&std::fs::read(&dst).unwrap(), "csv");
}

#[tokio::test]
async fn test_convert_text_uses_writer() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("notes with spaces.txt");
    std::fs::write(&src, "Quarterly notes\n\nEverything is on track.\n").unwrap();
    let dst = output_dir().join("notes.pdf");

    let report = converter()
        .convert(&src, &dst)
        .await
        .expect("conversion should succeed");

    assert_eq!(report.profile, ExportProfile::Writer);
    assert_eq!(report.output_bytes, std::fs::metadata(&dst).unwrap().len());
    assert_pdf(&std::fs::read(&dst).unwrap(), "txt");
}

#[tokio::test]
async fn test_convert_bytes_cleans_up() {
    e2e_skip_unless_enabled!();
    let scratch = tempfile::tempdir().unwrap();
    let config = ConverterConfig::builder()
        .temp_dir(scratch.path())
        .build()
        .unwrap();
    let converter = OfficeConverter::new(config);

    let pdf = converter
        .convert_bytes(b"a,b\n1,2\n", "csv")
        .await
        .expect("conversion should succeed");

    assert_pdf(&pdf, "bytes");
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_missing_input() {
    e2e_skip_unless_enabled!();

    let err = converter()
        .convert("/definitely/not/a/real/file.docx", output_dir().join("x.pdf"))
        .await
        .unwrap_err();
    assert!(matches!(err, ConvertError::FileNotFound { .. }));
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_convert_docx_fixture() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.docx"));
    let dst = output_dir().join("sample_docx.pdf");

    let report = converter().convert(&path, &dst).await.expect("conversion");
    assert_eq!(report.filter, "writer_pdf_Export");
    assert_pdf(&std::fs::read(&dst).unwrap(), "docx");
}

#[tokio::test]
async fn test_convert_xlsx_fixture() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.xlsx"));
    let dst = output_dir().join("sample_xlsx.pdf");

    let report = converter().convert(&path, &dst).await.expect("conversion");
    assert_eq!(report.filter, "calc_pdf_Export");
    assert_pdf(&std::fs::read(&dst).unwrap(), "xlsx");
}

#[tokio::test]
async fn test_sequential_conversions_share_one_session() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let converter = converter();

    for i in 0..3 {
        let src = dir.path().join(format!("page{i}.txt"));
        std::fs::write(&src, format!("Document number {i}\n")).unwrap();
        converter
            .convert(&src, dir.path().join(format!("page{i}.pdf")))
            .await
            .expect("conversion should succeed");
    }
    assert_eq!(converter.session_generation().await, 1);
}
