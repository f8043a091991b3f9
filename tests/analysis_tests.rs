use mmkp_bench::analysis::{correlate, pearson, problem_analysis, ANALYSIS_WORKBOOK};
use mmkp_bench::catalog::{BenchmarkFile, BenchmarkGroup, HIREMATH_HILL_FOLDER, ORLIB_FOLDER};
use mmkp_bench::config::{Paths, Settings};
use mmkp_bench::error::BenchError;
use mmkp_bench::instance::{read_hiremath_hill, read_orlib};
use mmkp_bench::workbook::{round_sig3, Workbook};
use std::fs;

const ORLIB: &str = "2 2 2\n10 10\n1\n5 1 2\n3 2 1\n2\n4 3 3\n1 1 4\n";
const HH: &str = "1 1 2 1\n5\n1\n3 1\n4 2\n\n2 1 2 1\n5\n1\n1 4\n2 3\n";

#[test]
fn test_read_orlib() {
    let inst = read_orlib(ORLIB).unwrap();
    assert_eq!(inst.capacities, vec![10.0, 10.0]);
    assert_eq!(inst.classes.len(), 2);
    assert_eq!(inst.classes[1][1].profit, 1.0);
    assert_eq!(inst.classes[1][1].weights, vec![1.0, 4.0]);
    assert_eq!(inst.items().count(), 4);
}

#[test]
fn test_read_hiremath_hill_picks_numbered_instance() {
    let second = read_hiremath_hill(HH, 2).unwrap();
    assert_eq!(second.classes[0][0].profit, 1.0);
    assert_eq!(second.classes[0][1].weights, vec![3.0]);

    let first = read_hiremath_hill(HH, 1).unwrap();
    assert_eq!(first.classes[0][1].profit, 4.0);

    assert!(matches!(
        read_hiremath_hill(HH, 3),
        Err(BenchError::Validation(_))
    ));
}

#[test]
fn test_reader_errors_carry_line_numbers() {
    match read_orlib("2 2 2\n10 x\n") {
        Err(BenchError::Parse { line, reason }) => {
            assert_eq!(line, 2);
            assert!(reason.contains("capacity"));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(
        read_orlib("2 2 2\n10 10\n1\n5 1"),
        Err(BenchError::Parse { .. })
    ));
}

#[test]
fn test_correlate() {
    let inst = read_hiremath_hill(HH, 2).unwrap();
    let c = correlate("x".into(), &inst);
    assert_eq!(c.per_constraint.len(), 1);
    assert!((c.per_constraint[0].unwrap() + 1.0).abs() < 1e-12);
    assert!((c.mean_weight.unwrap() + 1.0).abs() < 1e-12);
}

#[test]
fn test_problem_analysis_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let paths = Paths {
        data_dir: dir.path().join("data"),
        results_dir: dir.path().join("results"),
        ..Default::default()
    };
    fs::create_dir_all(paths.data_dir.join(ORLIB_FOLDER)).unwrap();
    fs::create_dir_all(paths.data_dir.join(HIREMATH_HILL_FOLDER)).unwrap();
    fs::write(paths.data_dir.join(ORLIB_FOLDER).join("I01"), ORLIB).unwrap();
    fs::write(paths.data_dir.join(HIREMATH_HILL_FOLDER).join("HHI5.txt"), HH).unwrap();

    let settings = Settings {
        groups: vec![
            BenchmarkGroup::new(ORLIB_FOLDER, vec![BenchmarkFile::new("I01", 1)]),
            BenchmarkGroup::new(HIREMATH_HILL_FOLDER, vec![BenchmarkFile::new("HHI5.txt", 2)]),
        ],
        ..Default::default()
    };

    problem_analysis(&settings, &paths).unwrap();
    let wb = Workbook::load(paths.results_dir.join(ANALYSIS_WORKBOOK)).unwrap();

    let orlib = wb.sheet("orlib").unwrap();
    assert_eq!(orlib.get(2, 1).as_text(), Some("Problem"));
    assert_eq!(orlib.get(2, 2).as_text(), Some("C_0"));
    assert_eq!(orlib.get(2, 4).as_text(), Some("E_C/n"));
    assert_eq!(orlib.get(3, 1).as_text(), Some("I01"));
    let expected = pearson(&[5.0, 3.0, 4.0, 1.0], &[1.0, 2.0, 3.0, 1.0]).unwrap();
    assert_eq!(orlib.number(3, 2), Some(round_sig3(expected)));

    let hh = wb.sheet("HHI5").unwrap();
    assert_eq!(hh.get(3, 1).as_text(), Some("HHI5.txt1"));
    assert_eq!(hh.get(4, 1).as_text(), Some("HHI5.txt2"));
    assert_eq!(hh.number(3, 2), Some(1.0));
    assert_eq!(hh.number(4, 3), Some(-1.0));
}

#[test]
fn test_missing_instance_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let paths = Paths {
        data_dir: dir.path().to_path_buf(),
        results_dir: dir.path().join("results"),
        ..Default::default()
    };
    let settings = Settings {
        groups: vec![BenchmarkGroup::new(ORLIB_FOLDER, vec![BenchmarkFile::new("I99", 1)])],
        ..Default::default()
    };
    assert!(matches!(
        problem_analysis(&settings, &paths),
        Err(BenchError::Config(_))
    ));
}
