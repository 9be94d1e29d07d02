mod common;

use common::{data_rows, fixture_document, star_table};
use proptest::prelude::*;
use star_managed::{
    Anomaly, Document, StarError,
    combine::{self, Alignment, CombineOptions},
    key::{UNKEYED, extract_key, sort_rows_by_key},
    scanner::Dialect,
};

#[test]
fn key_extraction_examples() {
    assert_eq!(extract_key("rec_PD272_03.tomostar"), 3);
    assert_eq!(extract_key("foo_12"), 12);
    assert_eq!(extract_key("nomatch"), UNKEYED);
}

#[test]
fn source_rows_sort_numerically_not_lexically() {
    let source = fixture_document("priors.star");
    let sorted = combine::sort_source(
        &source,
        &Dialect::default(),
        "data_particles",
        "_rlnMicrographName",
    )
    .expect("sort");
    let keys = sorted.rows.iter().map(|r| r.key).collect::<Vec<_>>();
    assert_eq!(keys, vec![1, 2, 10]);
    assert!(sorted.anomalies.is_empty());
}

#[test]
fn equal_keys_keep_input_order() {
    let source = star_table(
        "data_particles",
        &["_rlnMicrographName", "_rlnHelicalTubeID"],
        &["a_1.mrc first", "nokey second", "b_2.mrc third", "c_1.mrc fourth"],
    );
    let sorted = combine::sort_source(
        &source,
        &Dialect::default(),
        "data_particles",
        "_rlnMicrographName",
    )
    .expect("sort");
    let order = sorted
        .rows
        .iter()
        .map(|r| r.row.fields()[1].as_str())
        .collect::<Vec<_>>();
    assert_eq!(order, vec!["first", "fourth", "third", "second"]);
}

#[test]
fn combine_appends_columns_in_sorted_order() {
    let source = fixture_document("priors.star");
    let mut target = fixture_document("target.star");
    let (_, report) =
        combine::combine(&source, &mut target, &CombineOptions::default()).expect("combine");

    assert_eq!(report.source_rows, 3);
    assert_eq!(report.target_rows, 3);
    assert_eq!(report.rows_extended, 3);
    assert!(report.anomalies.is_empty());

    let expected = "\
data_optics

loop_
_rlnOpticsGroup #1
1

data_particles

loop_
_rlnCoordinateX #1
_rlnCoordinateY #2
_rlnMicrographName #3
_rlnHelicalTubeID #4
_rlnAngleTiltPrior #5
_rlnAnglePsiPrior #6
100.0  200.0  rec_1.tomostar  1  88.000000  -45.000000
110.0  210.0  rec_2.tomostar  2  91.500000  170.000000
120.0  220.0  rec_10.tomostar  3  90.000000  12.000000

";
    assert_eq!(target.render(), expected);
}

#[test]
fn sorted_source_keeps_surrounding_lines() {
    let source = fixture_document("priors.star");
    let mut target = fixture_document("target.star");
    let (sorted, _) =
        combine::combine(&source, &mut target, &CombineOptions::default()).expect("combine");

    assert_eq!(sorted.len(), source.len());
    assert_eq!(sorted.lines()[..10], source.lines()[..10]);
    assert_eq!(
        data_rows(&sorted, "data_particles"),
        vec![
            "rec_1.tomostar  1  88.000000  -45.000000",
            "rec_2.tomostar  2  91.500000  170.000000",
            "rec_10.tomostar  3  90.000000  12.000000",
        ]
    );
}

#[test]
fn ordinals_continue_after_highest_existing() {
    let source = star_table(
        "data_particles",
        &["_rlnMicrographName", "_rlnX", "_rlnY", "_rlnZ"],
        &["m_1.mrc 1 2 3"],
    );
    let mut target =
        Document::parse("data_particles\nloop_\n_rlnA #1\n_rlnB #7\n_rlnC #2\nr1 r2 r3\n");
    let options = CombineOptions {
        columns: vec!["_rlnZ".into(), "_rlnX".into(), "_rlnY".into()],
        ..CombineOptions::default()
    };
    combine::combine(&source, &mut target, &options).expect("combine");
    assert_eq!(
        target.render(),
        "data_particles\nloop_\n_rlnA #1\n_rlnB #7\n_rlnC #2\n_rlnZ #8\n_rlnX #9\n_rlnY #10\nr1 r2 r3  3  1  2\n"
    );
}

#[test]
fn strict_alignment_rejects_row_count_mismatch() {
    let source = fixture_document("priors.star");
    let original = star_table(
        "data_particles",
        &["_rlnMicrographName"],
        &["rec_1.tomostar", "rec_2.tomostar"],
    );
    let mut target = original.clone();
    let options = CombineOptions {
        alignment: Alignment::Strict,
        ..CombineOptions::default()
    };
    let err = combine::combine(&source, &mut target, &options).unwrap_err();
    assert_eq!(
        err,
        StarError::RowCountMismatch {
            target: 2,
            source_rows: 3,
        }
    );
    assert_eq!(target, original);
}

#[test]
fn extra_target_rows_stay_unextended_when_not_strict() {
    let source = star_table(
        "data_particles",
        &["_rlnMicrographName", "_rlnHelicalTubeID"],
        &["m_1.mrc 7"],
    );
    let mut target = star_table("data_particles", &["_rlnA"], &["x", "y"]);
    let options = CombineOptions {
        columns: vec!["_rlnHelicalTubeID".into()],
        alignment: Alignment::Off,
        ..CombineOptions::default()
    };
    let (_, report) = combine::combine(&source, &mut target, &options).expect("combine");
    assert_eq!(report.rows_extended, 1);
    assert_eq!(data_rows(&target, "data_particles"), vec!["x  7", "y"]);
}

#[test]
fn short_source_row_yields_placeholders() {
    let source = star_table(
        "data_particles",
        &["_rlnMicrographName", "_rlnHelicalTubeID", "_rlnAnglePsiPrior"],
        &["m_1.mrc 1 10.0", "m_2.mrc 2"],
    );
    let mut target = star_table("data_particles", &["_rlnA"], &["x", "y"]);
    let options = CombineOptions {
        columns: vec!["_rlnHelicalTubeID".into(), "_rlnAnglePsiPrior".into()],
        placeholder: "?".into(),
        ..CombineOptions::default()
    };
    let (_, report) = combine::combine(&source, &mut target, &options).expect("combine");
    assert_eq!(
        data_rows(&target, "data_particles"),
        vec!["x  1  10.0", "y  ?  ?"]
    );
    assert_eq!(
        report.anomalies,
        vec![Anomaly::RowShortfall {
            line: 7,
            column: "_rlnAnglePsiPrior".to_string(),
            width: 2,
        }]
    );
}

#[test]
fn missing_extraction_column_aborts_before_touching_target() {
    let source = star_table(
        "data_particles",
        &["_rlnMicrographName", "_rlnHelicalTubeID"],
        &["m_1.mrc 1"],
    );
    let original = star_table("data_particles", &["_rlnA"], &["x"]);
    let mut target = original.clone();
    let err = combine::combine(&source, &mut target, &CombineOptions::default()).unwrap_err();
    assert_eq!(
        err,
        StarError::RequiredColumnMissing {
            column: "_rlnAngleTiltPrior".to_string(),
            section: "data_particles".to_string(),
        }
    );
    assert_eq!(target, original);
}

#[test]
fn row_too_short_for_key_sorts_last_and_is_reported() {
    let source = star_table(
        "data_particles",
        &[
            "_rlnHelicalTubeID",
            "_rlnAngleTiltPrior",
            "_rlnAnglePsiPrior",
            "_rlnMicrographName",
        ],
        &["1 90.0 10.0 m_2.mrc", "4 5 6", "2 91.0 20.0 m_1.mrc"],
    );
    let sorted = combine::sort_source(
        &source,
        &Dialect::default(),
        "data_particles",
        "_rlnMicrographName",
    )
    .expect("sort");
    let keys = sorted.rows.iter().map(|r| r.key).collect::<Vec<_>>();
    assert_eq!(keys, vec![1, 2, UNKEYED]);

    let mut target = star_table("data_particles", &["_rlnA"], &["x", "y", "z"]);
    let (_, report) =
        combine::combine(&source, &mut target, &CombineOptions::default()).expect("combine");
    assert_eq!(
        data_rows(&target, "data_particles"),
        vec!["x  2  91.0  20.0", "y  1  90.0  10.0", "z  4  5  6"]
    );
    assert_eq!(
        report.anomalies,
        vec![Anomaly::RowShortfall {
            line: 8,
            column: "_rlnMicrographName".to_string(),
            width: 3,
        }]
    );
}

#[test]
fn warn_alignment_merges_by_position_despite_mismatch() {
    let source = fixture_document("priors.star");
    let mut target = star_table("data_particles", &["_rlnA"], &["a", "b", "c", "d"]);
    let options = CombineOptions {
        alignment: Alignment::Warn,
        ..CombineOptions::default()
    };
    let (_, report) = combine::combine(&source, &mut target, &options).expect("combine");
    assert_eq!(report.source_rows, 3);
    assert_eq!(report.target_rows, 4);
    assert_eq!(report.rows_extended, 3);
    assert_eq!(
        data_rows(&target, "data_particles"),
        vec![
            "a  1  88.000000  -45.000000",
            "b  2  91.500000  170.000000",
            "c  3  90.000000  12.000000",
            "d",
        ]
    );
}

proptest! {
    #[test]
    fn sort_is_stable_for_equal_keys(keys in proptest::collection::vec(0u64..4, 0..40)) {
        let rows = keys.iter().copied().enumerate().collect::<Vec<_>>();
        let sorted = sort_rows_by_key(rows, |(_, key)| *key);
        prop_assert_eq!(sorted.len(), keys.len());
        for pair in sorted.windows(2) {
            let (first_idx, first_key) = pair[0];
            let (second_idx, second_key) = pair[1];
            prop_assert!(first_key <= second_key);
            if first_key == second_key {
                prop_assert!(first_idx < second_idx);
            }
        }
    }
}
