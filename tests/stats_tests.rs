use mmkp_bench::significance::{
    family_test, pair_sheet, significance_workbook, PairTest, VariantSamples, PLAIN_FAMILY,
};
use mmkp_bench::stats::{f_oneway, kruskal, rank_average, ranksums};
use mmkp_bench::workbook::Cell;
use std::io::Cursor;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

const A: [f64; 3] = [1.0, 2.0, 3.0];
const B: [f64; 3] = [4.0, 5.0, 6.0];

#[test]
fn test_f_oneway_two_groups() {
    let r = f_oneway(&[&A, &B]);
    assert!(close(r.statistic, 13.5));
    assert!(close(r.pvalue, 0.021_311_641_128_756_723));
}

#[test]
fn test_f_oneway_identical_groups() {
    let r = f_oneway(&[&A, &A]);
    assert!(close(r.statistic, 0.0));
    assert!(close(r.pvalue, 1.0));
}

#[test]
fn test_f_oneway_zero_variance_is_undefined() {
    let r = f_oneway(&[&[2.0, 2.0], &[2.0, 2.0]]);
    assert!(!r.is_defined());
}

#[test]
fn test_f_oneway_constant_groups_with_different_means() {
    let r = f_oneway(&[&[2.0, 2.0, 2.0], &[5.0, 5.0]]);
    assert!(r.is_defined());
    assert_eq!(r.statistic, f64::INFINITY);
    assert_eq!(r.pvalue, 0.0);
}

#[test]
fn test_kruskal_without_ties() {
    let r = kruskal(&[&[1.0, 3.0, 5.0, 7.0, 9.0], &[2.0, 4.0, 6.0, 8.0, 10.0]]);
    assert!(close(r.statistic, 0.272_727_272_727_273));
    assert!(close(r.pvalue, 0.601_508_134_440_589_5));
}

#[test]
fn test_kruskal_tie_correction() {
    let r = kruskal(&[&[1.0, 1.0, 1.0], &[2.0, 2.0, 2.0], &[2.0, 2.0]]);
    assert!(close(r.statistic, 7.0));
    assert!(close(r.pvalue, 0.030_197_383_422_318_5));
}

#[test]
fn test_kruskal_all_tied_is_undefined() {
    let r = kruskal(&[&[1.0, 1.0], &[1.0, 1.0]]);
    assert!(r.statistic.is_nan());
    assert!(r.pvalue.is_nan());
}

#[test]
fn test_ranksums() {
    let r = ranksums(&A, &B);
    assert!(close(r.statistic, -1.963_961_012_123_931_5));
    assert!(close(r.pvalue, 0.049_534_613_435_626_49));

    // Symmetric in sign, same p-value.
    let flipped = ranksums(&B, &A);
    assert!(close(flipped.statistic, -r.statistic));
    assert!(close(flipped.pvalue, r.pvalue));
}

#[test]
fn test_rank_average_with_ties() {
    let (ranks, ties) = rank_average(&[10.0, 20.0, 10.0, 30.0]);
    assert_eq!(ranks, vec![1.5, 3.0, 1.5, 4.0]);
    assert_eq!(ties, 6.0);
}

const SHEET: &str = "Problem,tlbo,tt-tlbo,mod-tlbo\n\
                     p1,1,4,1\n\
                     p2,2,5,\n\
                     p3,3,6,3\n";

#[test]
fn test_samples_from_header() {
    let samples = VariantSamples::from_reader(Cursor::new(SHEET), &[]).unwrap();
    assert_eq!(samples.names, vec!["tlbo", "tt-tlbo", "mod-tlbo"]);
    assert_eq!(samples.columns[0], vec![1.0, 2.0, 3.0]);
    // Blank cells are skipped.
    assert_eq!(samples.columns[2], vec![1.0, 3.0]);
}

#[test]
fn test_samples_without_header_use_fallback_names() {
    let fallback = vec!["x".to_string()];
    let samples = VariantSamples::from_reader(Cursor::new("1,1,4\n2,2,5\n"), &fallback).unwrap();
    assert_eq!(samples.names, vec!["x", "variant-2"]);
    assert_eq!(samples.columns[1], vec![4.0, 5.0]);
}

#[test]
fn test_pair_sheet_layout() {
    let samples = VariantSamples::from_reader(Cursor::new(SHEET), &[]).unwrap();
    let sheet = pair_sheet(PairTest::RankSum, &samples);
    let n = 3;

    assert_eq!(sheet.get(0, 0).as_text(), Some("Mann-Whitney-Wilcoxon Rank Sum test"));
    assert_eq!(sheet.get(1, 0).as_text(), Some("p-value"));
    assert_eq!(sheet.get(n + 3, 0).as_text(), Some("z-statistic"));
    assert_eq!(sheet.get(2, 3).as_text(), Some("tt-tlbo"));
    assert_eq!(sheet.get(4, 1).as_text(), Some("tt-tlbo"));
    assert_eq!(sheet.get(n + 4, 2).as_text(), Some("tlbo"));
    assert_eq!(sheet.get(n + 5, 1).as_text(), Some("tlbo"));

    // tlbo vs tt-tlbo
    let p = sheet.number(3, 3).unwrap();
    let z = sheet.number(n + 5, 3).unwrap();
    assert!(close(p, 0.049_534_613_435_626_49));
    assert!(close(z, -1.963_961_012_123_931_5));
}

#[test]
fn test_undefined_results_are_written_as_na() {
    let samples = VariantSamples::from_reader(Cursor::new("h,a,b\n1,2,2\n2,2,2\n"), &[]).unwrap();
    let sheet = pair_sheet(PairTest::Kruskal, &samples);
    assert_eq!(sheet.get(3, 2), &Cell::Text("NA".into()));
}

#[test]
fn test_workbook_has_three_sheets() {
    let samples = VariantSamples::from_reader(Cursor::new(SHEET), &[]).unwrap();
    let wb = significance_workbook(&samples);
    let names: Vec<&str> = wb.sheets().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["anova", "Kruskal", "RankSum"]);
    assert_eq!(
        wb.sheet("anova").unwrap().get(6, 0).as_text(),
        Some("f-value")
    );
}

#[test]
fn test_family_test_requires_all_columns() {
    let samples = VariantSamples::from_reader(Cursor::new(SHEET), &[]).unwrap();
    assert!(family_test(&samples, &PLAIN_FAMILY).is_none());
    assert!(family_test(&samples, &[0, 1]).is_some());
}
