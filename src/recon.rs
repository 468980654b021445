pub mod charts;
pub mod io_common;
pub mod io_json;
pub mod io_xlsx;
pub mod retriever;

use log::{debug, info, warn};

use cons_relation::summary::{column_values, describe};
use cons_relation::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::recon::io_common::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ReconError {
    #[snafu(display("Error opening file {path}: {source}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON content of {path}: {source}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Unexpected content in {path}: {source}"))]
    ParsingDocument {
        source: RelationErrors,
        path: String,
    },
    #[snafu(display("Error serializing {path}: {source}"))]
    SerializingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}: {source}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing workbook {path}: {source}"))]
    WritingExcel {
        source: rust_xlsxwriter::XlsxError,
        path: String,
    },
    #[snafu(display("Error drawing chart {path}: {message}"))]
    DrawingChart { path: String, message: String },
    #[snafu(display("Error reading the list of sources {path}: {source}"))]
    ReadingSourceList {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error creating the data directory {path}: {source}"))]
    CreatingDataDir {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Invalid URL {url}: {source}"))]
    InvalidUrl {
        source: url::ParseError,
        url: String,
    },
    #[snafu(display("Error setting up the HTTP client: {source}"))]
    HttpClient { source: reqwest::Error },
    #[snafu(display("Error downloading {url}: {source}"))]
    Fetching { source: reqwest::Error, url: String },
    #[snafu(display("Error downloading {url}: HTTP status {status}"))]
    HttpStatus { status: u16, url: String },
    #[snafu(display("Invalid JSON from {url}: {source}"))]
    InvalidJson {
        source: serde_json::Error,
        url: String,
    },
    #[snafu(display("Difference detected between the computed relation and the reference {path}"))]
    ReferenceMismatch { path: String },
}

pub type ReconResult<T> = Result<T, ReconError>;

/// Options of one reconciliation run.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ReconcileOptions {
    pub data_dir: PathBuf,
    pub reference: Option<PathBuf>,
    pub draw_charts: bool,
}

/// Sizes of the outputs of one reconciliation run.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ReconcileSummary {
    pub constituencies: usize,
    pub interest: usize,
    pub uninterest: usize,
    pub indeterminate: usize,
}

/// Reads a whole JSON document. A missing file and invalid JSON are both errors.
pub fn read_document(path: &Path) -> ReconResult<JSValue> {
    let p = path.display().to_string();
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path: &p })?;
    debug!("read_document: {} bytes from {}", contents.len(), p);
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path: p })
}

/// Loads both source documents and builds the relation.
pub fn load_relation(info_path: &Path, stats_path: &Path) -> ReconResult<RelationTable> {
    info!("Loading data files...");
    let info_doc = read_document(info_path)?;
    let stats_doc = read_document(stats_path)?;

    let infos = reader::read_info(&info_doc).context(ParsingDocumentSnafu {
        path: info_path.display().to_string(),
    })?;
    let stats = reader::read_stats(&stats_doc).context(ParsingDocumentSnafu {
        path: stats_path.display().to_string(),
    })?;

    info!("Processing constituencies...");
    Ok(build_relation(&infos, &stats))
}

/// Runs the whole reconciliation: relation, partitions, reports and charts.
pub fn run_reconciliation(opts: &ReconcileOptions) -> ReconResult<ReconcileSummary> {
    let data_dir = opts.data_dir.as_path();
    let table = load_relation(&data_dir.join(INFO_FILE), &data_dir.join(STATS_FILE))?;
    println!("Processed {} constituencies", table.rows.len());
    print_overview(&table);

    write_report(data_dir, RELATION_NAME, &table.rows)?;

    let diffs = column_values(&table.rows, |r| r.mp_party_diff.map(|x| x as f64));
    let errors = column_values(&table.rows, |r| r.mp_party_error_per_station);
    if opts.draw_charts {
        let p = data_dir.join(MP_PARTY_DIFF_HISTOGRAM);
        charts::draw_histogram(&p, &diffs, &BinLayout::MP_PARTY_DIFF, &charts::MP_PARTY_DIFF_TEXT)?;
        println!("Histogram saved to {}", p.display());
    }
    print_describe("mp_party_diff", &diffs);
    if opts.draw_charts {
        let p = data_dir.join(ERROR_PER_STATION_HISTOGRAM);
        charts::draw_histogram(
            &p,
            &errors,
            &BinLayout::ERROR_PER_STATION,
            &charts::ERROR_PER_STATION_TEXT,
        )?;
        println!("Histogram saved to {}", p.display());
    }
    print_describe("mp_party_error_per_station", &errors);

    let parts = partition(&table);
    println!(
        "Constituencies with |mp_party_error_per_station| > {}: {}",
        INTEREST_THRESHOLD,
        parts.interest.len()
    );
    write_report(data_dir, INTEREST_NAME, &parts.interest)?;
    if opts.draw_charts && !parts.interest.is_empty() {
        let sorted = sorted_by_mp_party_diff(&parts.interest);
        let p = data_dir.join(INTEREST_BAR_CHART);
        charts::draw_interest_bars(&p, &sorted)?;
        println!("Plot saved to {}", p.display());
    }

    println!(
        "Constituencies with |mp_party_error_per_station| <= {}: {}",
        INTEREST_THRESHOLD,
        parts.uninterest.len()
    );
    write_report(data_dir, UNINTEREST_NAME, &parts.uninterest)?;
    if parts.indeterminate > 0 {
        warn!(
            "{} constituencies have no mp_party_error_per_station and are in neither set",
            parts.indeterminate
        );
    }

    if let Some(reference) = opts.reference.as_deref() {
        check_reference(&table.rows, reference)?;
    }

    Ok(ReconcileSummary {
        constituencies: table.rows.len(),
        interest: parts.interest.len(),
        uninterest: parts.uninterest.len(),
        indeterminate: parts.indeterminate,
    })
}

/// Writes one set of rows as a record list and as a workbook.
pub fn write_report(data_dir: &Path, name: &str, rows: &[RelationRow]) -> ReconResult<()> {
    let json_path = data_dir.join(format!("{}.json", name));
    println!("Saving to {}...", json_path.display());
    io_json::write_pretty_json(&json_path, rows)?;

    let xlsx_path = data_dir.join(format!("{}.xlsx", name));
    println!("Saving to {}...", xlsx_path.display());
    io_xlsx::write_workbook(&xlsx_path, rows)
}

fn print_overview(table: &RelationTable) {
    println!(
        "Relation shape: ({}, {})",
        table.rows.len(),
        RelationRow::COLUMNS.len()
    );
    println!("Columns: {:?}", RelationRow::COLUMNS);
    println!("First 5 rows:");
    for row in table.rows.iter().take(5) {
        println!(
            "  cons_id={} prov_id={} cons_no={} mp_party_diff={} mp_party_error_per_station={}",
            fmt_key(&row.cons_id),
            fmt_key(&row.prov_id),
            fmt_key(&row.cons_no),
            row.mp_party_diff
                .map(|x| x.to_string())
                .unwrap_or_else(|| "-".to_string()),
            row.mp_party_error_per_station
                .map(|x| format!("{:.3}", x))
                .unwrap_or_else(|| "-".to_string()),
        );
    }
}

fn fmt_key(k: &Option<ConsKey>) -> String {
    k.as_ref()
        .map(|x| x.to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn print_describe(column: &str, values: &[f64]) {
    println!("Statistics for {}:", column);
    match describe(values) {
        Some(d) => println!("{}", d),
        None => println!("count 0"),
    }
}

/// Compares the relation with a reference record list and prints the differences.
fn check_reference(rows: &[RelationRow], reference: &Path) -> ReconResult<()> {
    let p = reference.display().to_string();
    let reference_js = read_document(reference)?;
    info!("Comparing the relation with the reference {}", p);
    let computed_js = serde_json::to_value(rows).context(SerializingJsonSnafu { path: &p })?;
    let pretty_ref =
        serde_json::to_string_pretty(&reference_js).context(SerializingJsonSnafu { path: &p })?;
    let pretty_computed =
        serde_json::to_string_pretty(&computed_js).context(SerializingJsonSnafu { path: &p })?;
    if pretty_ref != pretty_computed {
        warn!("Found differences with the reference");
        print_diff(pretty_ref.as_str(), pretty_computed.as_str(), "\n");
        return ReferenceMismatchSnafu { path: p }.fail();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_sources(dir: &Path) {
        let info = json!([
            {"cons_id": "C2", "cons_no": 2, "prov_id": 10, "total_vote_stations": 10, "registered_vote": 2000},
            {"cons_id": "C1", "cons_no": 1, "prov_id": 10, "total_vote_stations": 100, "registered_vote": 50000},
            {"cons_id": "C3", "cons_no": 1, "prov_id": 20, "total_vote_stations": 5, "registered_vote": 900},
            {"cons_id": "C4", "cons_no": 1, "prov_id": 5, "total_vote_stations": 5, "registered_vote": 900}
        ]);
        let stats = json!({
            "result_province": [
                {"prov_id": 10, "constituencies": [
                    {"cons_id": "C1", "turn_out": 40000, "valid_votes": 39000, "invalid_votes": 500,
                     "blank_votes": 500, "party_list_turn_out": 40000, "party_list_valid_votes": 38000,
                     "party_list_invalid_votes": 1000, "party_list_blank_votes": 1000,
                     "candidates": [{"mp_app_vote": 20000}, {"mp_app_vote": 19000}],
                     "result_party": [{"party_list_vote": 38000}]},
                    {"cons_id": "C2", "turn_out": 1500, "valid_votes": 1480, "invalid_votes": 10,
                     "blank_votes": 10, "party_list_turn_out": 1450, "party_list_valid_votes": 1430,
                     "party_list_invalid_votes": 10, "party_list_blank_votes": 10,
                     "candidates": [{"mp_app_vote": 1480}],
                     "result_party": [{"party_list_vote": 1430}]}
                ]},
                {"prov_id": 20, "constituencies": [
                    {"cons_id": "C3", "turn_out": 800, "valid_votes": 780, "invalid_votes": 10,
                     "blank_votes": 10, "party_list_turn_out": 800, "party_list_valid_votes": 780,
                     "party_list_invalid_votes": 10, "party_list_blank_votes": 10,
                     "candidates": [{"mp_app_vote": 790}],
                     "result_party": [{"party_list_vote": 780}]}
                ]}
            ]
        });
        fs::write(dir.join(INFO_FILE), serde_json::to_string(&info).unwrap()).unwrap();
        fs::write(dir.join(STATS_FILE), serde_json::to_string(&stats).unwrap()).unwrap();
    }

    fn ids(path: &Path) -> Vec<String> {
        let js = read_document(path).unwrap();
        js.as_array()
            .unwrap()
            .iter()
            .map(|r| r["cons_id"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn full_run_writes_all_reports() {
        let dir = tempfile::tempdir().unwrap();
        write_sources(dir.path());
        let opts = ReconcileOptions {
            data_dir: dir.path().to_path_buf(),
            reference: None,
            draw_charts: true,
        };
        let summary = run_reconciliation(&opts).unwrap();
        assert_eq!(
            summary,
            ReconcileSummary {
                constituencies: 4,
                interest: 1,
                uninterest: 2,
                indeterminate: 1,
            }
        );

        // Sorted by province then number; C4 has no statistics.
        assert_eq!(
            ids(&dir.path().join("relation_constituency.json")),
            vec!["C4", "C1", "C2", "C3"]
        );
        // C2: (1480 + 20) - (1430 + 20) = 50 over 10 stations.
        assert_eq!(ids(&dir.path().join("interest_constituency.json")), vec!["C2"]);
        assert_eq!(
            ids(&dir.path().join("uninterest_constituency.json")),
            vec!["C1", "C3"]
        );

        let relation = read_document(&dir.path().join("relation_constituency.json")).unwrap();
        assert_eq!(relation[0]["turn_out"], JSValue::Null);
        assert_eq!(relation[1]["mp_party_diff"], json!(0));
        assert_eq!(relation[2]["mp_party_error_per_station"], json!(5.0));
        assert_eq!(relation[3]["mp_party_error_per_station"], json!(2.0));

        for name in [RELATION_NAME, INTEREST_NAME, UNINTEREST_NAME] {
            assert!(dir.path().join(format!("{}.xlsx", name)).exists());
        }
        for chart in [
            MP_PARTY_DIFF_HISTOGRAM,
            ERROR_PER_STATION_HISTOGRAM,
            INTEREST_BAR_CHART,
        ] {
            assert!(dir.path().join(chart).exists(), "missing {}", chart);
        }
    }

    #[test]
    fn reference_check() {
        let dir = tempfile::tempdir().unwrap();
        write_sources(dir.path());
        let mut opts = ReconcileOptions {
            data_dir: dir.path().to_path_buf(),
            reference: None,
            draw_charts: false,
        };
        run_reconciliation(&opts).unwrap();
        assert!(!dir.path().join(MP_PARTY_DIFF_HISTOGRAM).exists());

        // The previous output is a valid reference for the same inputs.
        let reference = dir.path().join("reference.json");
        fs::copy(dir.path().join("relation_constituency.json"), &reference).unwrap();
        opts.reference = Some(reference.clone());
        run_reconciliation(&opts).unwrap();

        fs::write(&reference, "[]").unwrap();
        let err = run_reconciliation(&opts).unwrap_err();
        assert!(matches!(err, ReconError::ReferenceMismatch { .. }));
    }

    #[test]
    fn missing_source_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_relation(&dir.path().join(INFO_FILE), &dir.path().join(STATS_FILE))
            .unwrap_err();
        assert!(matches!(err, ReconError::OpeningJson { .. }));
    }

    #[test]
    fn malformed_source_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_sources(dir.path());
        fs::write(dir.path().join(STATS_FILE), "{\"result_province\": [").unwrap();
        let err = load_relation(&dir.path().join(INFO_FILE), &dir.path().join(STATS_FILE))
            .unwrap_err();
        assert!(matches!(err, ReconError::ParsingJson { .. }));

        fs::write(dir.path().join(INFO_FILE), "{}").unwrap();
        fs::write(dir.path().join(STATS_FILE), "{}").unwrap();
        let err = load_relation(&dir.path().join(INFO_FILE), &dir.path().join(STATS_FILE))
            .unwrap_err();
        assert!(matches!(
            err,
            ReconError::ParsingDocument {
                source: RelationErrors::InfoNotAList,
                ..
            }
        ));
    }
}
