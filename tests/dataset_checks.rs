use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use tempfile::TempDir;

use nyc311_check::check::{
    check_column_count, check_median_within_tolerance, nyc_311_checks, CheckError,
    EXPECTED_COLUMNS, NYC_LATITUDE, NYC_LONGITUDE, RELATIVE_TOLERANCE,
};
use nyc311_check::data::loader::{load_file, LoadError};
use nyc311_check::data::model::CellValue;
use nyc311_check::report::{run_checks, Status};
use nyc311_check::sample::write_sample_csv;
use nyc311_check::DEFAULT_DATA_PATH;

fn sample_file(dir: &TempDir, rows: usize) -> PathBuf {
    let path = dir.path().join("311_sample.csv");
    write_sample_csv(File::create(&path).unwrap(), rows, 42).unwrap();
    path
}

#[test]
#[ignore = "needs 311_jan_2022.csv"]
fn canonical_extract_passes() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_DATA_PATH);
    let ds = load_file(&path).unwrap();
    assert_eq!(check_column_count(&ds, EXPECTED_COLUMNS), Ok(()));
    assert!(
        check_median_within_tolerance(&ds, "Latitude", NYC_LATITUDE, RELATIVE_TOLERANCE).is_ok()
    );
    assert!(
        check_median_within_tolerance(&ds, "Longitude", NYC_LONGITUDE, RELATIVE_TOLERANCE).is_ok()
    );
}

#[test]
fn synthetic_extract_passes_every_check() {
    let dir = TempDir::new().unwrap();
    let ds = load_file(&sample_file(&dir, 500)).unwrap();

    let report = run_checks(&ds, &nyc_311_checks());
    assert_eq!(report.status(), Status::Passed, "{report}");
    assert_eq!(report.columns, 41);
    assert_eq!(report.rows, 500);
}

#[test]
fn loading_twice_gives_identical_medians() {
    let dir = TempDir::new().unwrap();
    let path = sample_file(&dir, 200);

    let first = load_file(&path).unwrap();
    let second = load_file(&path).unwrap();
    assert_eq!(first, second);

    let m1 = check_median_within_tolerance(&first, "Latitude", NYC_LATITUDE, RELATIVE_TOLERANCE);
    let m2 = check_median_within_tolerance(&first, "Latitude", NYC_LATITUDE, RELATIVE_TOLERANCE);
    let m3 = check_median_within_tolerance(&second, "Latitude", NYC_LATITUDE, RELATIVE_TOLERANCE);
    assert_eq!(m1, m2);
    assert_eq!(m1, m3);
}

#[test]
fn one_row_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("one.csv");
    std::fs::write(&path, "Latitude,Longitude\n40.7128,-74.0060\n").unwrap();

    let ds = load_file(&path).unwrap();
    assert_eq!(
        check_median_within_tolerance(&ds, "Latitude", NYC_LATITUDE, RELATIVE_TOLERANCE),
        Ok(40.7128)
    );
    assert_eq!(
        check_median_within_tolerance(&ds, "Longitude", NYC_LONGITUDE, RELATIVE_TOLERANCE),
        Ok(-74.0060)
    );
}

#[test]
fn missing_longitude_column() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no_lng.csv");
    std::fs::write(&path, "Latitude,Borough\n40.7,QUEENS\n").unwrap();

    let ds = load_file(&path).unwrap();
    assert_eq!(
        check_median_within_tolerance(&ds, "Longitude", NYC_LONGITUDE, RELATIVE_TOLERANCE),
        Err(CheckError::ColumnNotFound("Longitude".into()))
    );
}

#[test]
fn missing_file_is_a_load_error() {
    let dir = TempDir::new().unwrap();
    let err = load_file(&dir.path().join(DEFAULT_DATA_PATH)).unwrap_err();
    assert!(matches!(err, LoadError::NotFound(_)));
    assert!(err.to_string().contains("311_jan_2022.csv"));
}

#[test]
fn json_records_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("311.json");
    std::fs::write(
        &path,
        r#"[
            {"Unique Key": 1, "Latitude": 40.72, "Longitude": -73.93},
            {"Unique Key": 2, "Latitude": null, "Longitude": -73.94},
            {"Unique Key": 3, "Latitude": 40.74, "Longitude": -73.95},
            {"Unique Key": 4, "Latitude": 40.73, "Longitude": -73.92}
        ]"#,
    )
    .unwrap();

    let ds = load_file(&path).unwrap();
    assert_eq!(ds.column_names(), vec!["Unique Key", "Latitude", "Longitude"]);
    assert_eq!(
        check_median_within_tolerance(&ds, "Latitude", NYC_LATITUDE, RELATIVE_TOLERANCE),
        Ok(40.73)
    );
}

#[test]
fn parquet_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("311.parquet");

    let key: ArrayRef = Arc::new(Int64Array::from(vec![1, 2, 3]));
    let borough: ArrayRef = Arc::new(StringArray::from(vec!["BRONX", "QUEENS", "BROOKLYN"]));
    let lat: ArrayRef = Arc::new(Float64Array::from(vec![Some(40.70), None, Some(40.76)]));
    let lng: ArrayRef = Arc::new(Float64Array::from(vec![-73.90, -73.94, -73.96]));
    let batch = RecordBatch::try_from_iter(vec![
        ("Unique Key", key),
        ("Borough", borough),
        ("Latitude", lat),
        ("Longitude", lng),
    ])
    .unwrap();

    let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), batch.schema(), None)
        .unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let ds = load_file(&path).unwrap();
    assert_eq!(ds.num_columns(), 4);
    assert_eq!(ds.num_rows(), 3);
    assert_eq!(ds.column("Latitude").unwrap().values[1], CellValue::Null);
    assert_eq!(
        ds.column("Borough").unwrap().values[0],
        CellValue::String("BRONX".into())
    );
    assert_eq!(
        check_median_within_tolerance(&ds, "Longitude", NYC_LONGITUDE, RELATIVE_TOLERANCE),
        Ok(-73.94)
    );
}
