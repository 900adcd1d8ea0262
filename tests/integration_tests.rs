use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Helper function to run plotcsv with arguments and optional stdin input
fn run_plotcsv(args: &[&str], stdin: Option<&str>) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_plotcsv"))
        .args(args)
        .env_remove("PLOTCSV_VIEWER")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn plotcsv");

    if let Some(mut pipe) = child.stdin.take() {
        if let Some(content) = stdin {
            pipe.write_all(content.as_bytes())
                .expect("Failed to write to stdin");
        }
    }

    child.wait_with_output().expect("Failed to wait for plotcsv")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Check if bytes are a valid PNG
fn is_valid_png(bytes: &[u8]) -> bool {
    bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
}

fn out_path(dir: &tempfile::TempDir, name: &str) -> String {
    dir.path().join(name).to_string_lossy().into_owned()
}

#[test]
fn test_end_to_end_default_display() {
    let output = run_plotcsv(&["--viewer", "true"], Some("x,y\n0,1\n1,2\n2,3\n"));
    assert!(output.status.success(), "Failed: {}", stderr(&output));
}

#[test]
fn test_end_to_end_viewer_from_environment() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_plotcsv"))
        .env("PLOTCSV_VIEWER", "true")
        .stdin(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn plotcsv");
    if let Some(mut pipe) = child.stdin.take() {
        pipe.write_all(b"x,y\n0,1\n1,2\n").unwrap();
    }
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success(), "Failed: {}", stderr(&output));
}

#[test]
fn test_end_to_end_failing_viewer() {
    let output = run_plotcsv(&["--viewer", "false"], Some("x,y\n0,1\n"));
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Error:"));
}

#[test]
fn test_end_to_end_png_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_path(&dir, "chart.png");
    let output = run_plotcsv(
        &["test/timeseries.csv", "--out", &out, "--width", "600", "--height", "400"],
        None,
    );
    assert!(output.status.success(), "Failed: {}", stderr(&output));
    let bytes = fs::read(&out).unwrap();
    assert!(is_valid_png(&bytes), "Output is not a valid PNG");
}

#[test]
fn test_end_to_end_svg_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_path(&dir, "chart.svg");
    let output = run_plotcsv(
        &[
            "test/timeseries.csv",
            "--cols-by-name",
            "temperature,humidity",
            "--cols2-by-name",
            "load",
            "--ylabel2",
            "load",
            "--out",
            &out,
        ],
        None,
    );
    assert!(output.status.success(), "Failed: {}", stderr(&output));
    let svg = fs::read_to_string(&out).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("temperature"));
    assert!(svg.contains("load"));
}

#[test]
fn test_end_to_end_jpeg_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_path(&dir, "chart.jpg");
    let output = run_plotcsv(&["test/samples.csv", "--scatter", "--out", &out], None);
    assert!(output.status.success(), "Failed: {}", stderr(&output));
    let bytes = fs::read(&out).unwrap();
    assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
}

#[test]
fn test_end_to_end_unknown_extension() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_path(&dir, "chart.xyz");
    let output = run_plotcsv(&["test/timeseries.csv", "--out", &out], None);
    assert!(!output.status.success());
    assert!(!Path::new(&out).exists());
}

#[test]
fn test_end_to_end_styled_scatter() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_path(&dir, "chart.png");
    let output = run_plotcsv(
        &[
            "test/timeseries.csv",
            "--scatter",
            "--color",
            "red,#00ff00",
            "--marker",
            "o,s",
            "--markersize",
            "8",
            "--alpha",
            "0.5",
            "--legend-loc",
            "lower right",
            "--title",
            "Sensors",
            "--xrotate",
            "90",
            "--out",
            &out,
        ],
        None,
    );
    assert!(output.status.success(), "Failed: {}", stderr(&output));
    assert!(is_valid_png(&fs::read(&out).unwrap()));
}

#[test]
fn test_end_to_end_group_and_jitter() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_path(&dir, "chart.png");
    let output = run_plotcsv(
        &["test/samples.csv", "--group", "--jitter", "--tick-interval", "1", "--out", &out],
        None,
    );
    assert!(output.status.success(), "Failed: {}", stderr(&output));
    assert!(is_valid_png(&fs::read(&out).unwrap()));
}

#[test]
fn test_end_to_end_categorical_x() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_path(&dir, "chart.png");
    let output = run_plotcsv(&["test/categories.csv", "--allxticks", "--out", &out], None);
    assert!(output.status.success(), "Failed: {}", stderr(&output));
}

#[test]
fn test_end_to_end_tab_separated() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_path(&dir, "chart.png");
    let output = run_plotcsv(&["test/tabbed.tsv", "--sep", "tab", "--out", &out], None);
    assert!(output.status.success(), "Failed: {}", stderr(&output));
}

#[test]
fn test_end_to_end_merged_inputs_with_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_path(&dir, "chart.png");
    let output = run_plotcsv(
        &[
            "test/timeseries.csv",
            "test/samples.csv",
            "--suffix-names",
            "--cols-by-name",
            "load timeseries.csv,latency samples.csv",
            "--out",
            &out,
        ],
        None,
    );
    assert!(output.status.success(), "Failed: {}", stderr(&output));
}

#[test]
fn test_end_to_end_ylim_arity() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_path(&dir, "chart.png");
    let ok = run_plotcsv(&["test/timeseries.csv", "--ylim", "-5", "50", "--out", &out], None);
    assert!(ok.status.success(), "Failed: {}", stderr(&ok));

    let bad = run_plotcsv(&["--ylim", "1", "2", "3", "--viewer", "true"], Some("x,y\n0,1\n"));
    assert!(!bad.status.success());
    assert!(stderr(&bad).contains("provide one or two args to --ylim"));
}

#[test]
fn test_end_to_end_color_map_not_implemented() {
    let output = run_plotcsv(
        &["--color-map", r#"{"y": "red"}"#, "--viewer", "true"],
        Some("x,y\n0,1\n"),
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("--color-map is not implemented"));
}

#[test]
fn test_end_to_end_column_not_found() {
    let output = run_plotcsv(
        &["--cols-by-name", "nonexistent", "--viewer", "true"],
        Some("x,y\n0,1\n"),
    );
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("nonexistent"));
    assert!(err.contains("x,y"));
}

#[test]
fn test_end_to_end_column_index_too_large() {
    let output = run_plotcsv(&["--cols", "7", "--viewer", "true"], Some("x,y\n0,1\n"));
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Column 7 too large"));
}

#[test]
fn test_end_to_end_label_mismatch() {
    let output = run_plotcsv(
        &["--clabels", "a,b,c", "--viewer", "true"],
        Some("x,y\n0,1\n"),
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("number of column labels"));
}

#[test]
fn test_end_to_end_duplicate_labels() {
    let output = run_plotcsv(
        &["--clabels", "same,same", "--viewer", "true"],
        Some("x,a,b\n0,1,2\n"),
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("--suffix-names"));
}

#[test]
fn test_end_to_end_malformed_input() {
    let output = run_plotcsv(&["test/ragged.csv", "--viewer", "true"], None);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("ragged.csv"));
}

#[test]
fn test_end_to_end_empty_input() {
    let output = run_plotcsv(&["--viewer", "true"], Some("x,y\n"));
    assert!(!output.status.success());
}

#[test]
fn test_end_to_end_non_numeric_data() {
    let output = run_plotcsv(&["--viewer", "true"], Some("x,y\n0,abc\n1,def\n"));
    assert!(!output.status.success());
}

#[test]
fn test_end_to_end_missing_file() {
    let output = run_plotcsv(&["test/does_not_exist.csv", "--viewer", "true"], None);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("does_not_exist.csv"));
}
