use std::collections::HashSet;
use std::fs;
use std::path::Path;

use assert_matches::assert_matches;

use sra_rnaseq_tools::error::PipelineError;
use sra_rnaseq_tools::matrix::{aggregate_quant_dir, CountsMatrix};

fn write_quant(dir: &Path, sample: &str, rows: &[(&str, f64, f64)]) {
    let sample_dir = dir.join(sample);
    fs::create_dir_all(&sample_dir).unwrap();
    let mut content = String::from("Name\tLength\tEffectiveLength\tTPM\tNumReads\n");
    for (name, tpm, num_reads) in rows {
        content.push_str(&format!("{name}\t1000\t800\t{tpm}\t{num_reads}\n"));
    }
    fs::write(sample_dir.join("quant.sf"), content).unwrap();
}

#[test]
fn merges_two_samples_into_two_rows_and_four_data_columns() {
    let dir = tempfile::tempdir().unwrap();
    write_quant(
        dir.path(),
        "Sample1",
        &[("ENST0001", 10.0, 50.0), ("ENST0002", 5.0, 25.0)],
    );
    write_quant(
        dir.path(),
        "Sample2",
        &[("ENST0001", 20.0, 60.0), ("ENST0002", 15.0, 35.0)],
    );

    let matrix = aggregate_quant_dir(dir.path()).unwrap();
    assert_eq!(matrix.num_transcripts(), 2);
    assert_eq!(matrix.columns.len(), 4);
    let names: Vec<&str> = matrix
        .columns
        .iter()
        .map(|column| column.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "Sample1_TPM",
            "Sample1_NumReads",
            "Sample2_TPM",
            "Sample2_NumReads"
        ]
    );
    assert_eq!(matrix.column("Sample2_NumReads").unwrap().values, vec![60.0, 35.0]);
}

#[test]
fn transcript_set_is_the_union_and_gaps_are_zero_filled() {
    let dir = tempfile::tempdir().unwrap();
    write_quant(dir.path(), "Sample1", &[("ENST0001", 10.0, 50.0)]);
    write_quant(dir.path(), "Sample2", &[("ENST0002", 15.0, 35.0)]);

    let matrix = aggregate_quant_dir(dir.path()).unwrap();
    let transcripts: HashSet<&str> = matrix
        .transcript_ids
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(transcripts, HashSet::from(["ENST0001", "ENST0002"]));

    // ENST0002 was never quantified for Sample1, and vice versa
    assert_eq!(matrix.column("Sample1_TPM").unwrap().values, vec![10.0, 0.0]);
    assert_eq!(matrix.column("Sample1_NumReads").unwrap().values, vec![50.0, 0.0]);
    assert_eq!(matrix.column("Sample2_TPM").unwrap().values, vec![0.0, 15.0]);
    assert_eq!(matrix.column("Sample2_NumReads").unwrap().values, vec![0.0, 35.0]);
}

#[test]
fn samples_without_quant_file_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_quant(dir.path(), "Sample1", &[("ENST0001", 10.0, 50.0)]);
    fs::create_dir(dir.path().join("Sample2")).unwrap();

    let matrix = aggregate_quant_dir(dir.path()).unwrap();
    assert_eq!(matrix.columns.len(), 2);
    assert!(matrix.column("Sample2_TPM").is_none());
}

#[test]
fn empty_quant_dir_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("no_quant_here")).unwrap();

    let err = aggregate_quant_dir(dir.path()).unwrap_err();
    assert_matches!(err, PipelineError::NoQuantFiles(_));
}

#[test]
fn tsv_roundtrip_preserves_the_matrix() {
    let dir = tempfile::tempdir().unwrap();
    write_quant(
        dir.path(),
        "Sample1",
        &[("ENST0001", 10.5, 50.0), ("ENST0002", 5.0, 25.0)],
    );
    write_quant(dir.path(), "Sample2", &[("ENST0003", 15.0, 35.0)]);

    let matrix = aggregate_quant_dir(dir.path()).unwrap();
    let out_path = dir.path().join("counts").join("expression_matrix.tsv");
    matrix.write_tsv(&out_path).unwrap();

    let loaded = CountsMatrix::read_tsv(&out_path).unwrap();
    assert_eq!(loaded.transcript_ids, matrix.transcript_ids);
    assert_eq!(loaded.columns.len(), matrix.columns.len());
    for (left, right) in loaded.columns.iter().zip(&matrix.columns) {
        assert_eq!(left.name, right.name);
        assert_eq!(left.values, right.values);
    }
}
