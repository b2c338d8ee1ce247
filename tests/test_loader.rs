mod common;
use common::*;
use gazeprep::gaze::{load_family, load_gaze_files, merge_rows, Blink, Fixation, Sample};
use gazeprep::PipelineConfig;

#[test]
fn families_merge_across_files_sorted_and_deduped() {
    let dir = tempdir();
    write_file(dir.path(), "s1_part2_Fixation.csv", FIXATION_HEADER, &[
        "R,300,400,100,1,1,900",
        "L,300,400,100,1,1,900",
        "R,100,200,100,1,1,900",
    ]);
    write_file(dir.path(), "s1_part1_Fixation.csv", FIXATION_HEADER, &[
        "R,100,200,100,1,1,900", // duplicate of a row in part2
        "R,500,560,60,2,2,910",
    ]);

    let fix: Vec<Fixation> = load_family(dir.path(), "R").unwrap();
    let starts: Vec<f64> = fix.iter().map(|f| f.t_start).collect();
    assert_eq!(starts, vec![100.0, 300.0, 500.0]);
    assert!(fix.iter().all(|f| f.eye.as_deref() == Some("R")));
}

#[test]
fn files_without_eye_column_are_not_filtered() {
    let dir = tempdir();
    write_file(dir.path(), "s1_Blink.csv", "tStart,tEnd,duration", &["50,150,100", "10,40,30"]);
    let blinks: Vec<Blink> = load_family(dir.path(), "R").unwrap();
    assert_eq!(blinks.len(), 2);
    assert_eq!(blinks[0].t_start, 10.0);
}

#[test]
fn missing_family_is_empty_table() {
    let dir = tempdir();
    write_file(dir.path(), "s1_Blink.csv", BLINK_HEADER, &["R,10,40,30"]);
    let tables = load_gaze_files(dir.path(), &PipelineConfig::default()).into_tables().unwrap();
    assert!(tables.fixations.is_empty());
    assert!(tables.saccades.is_empty());
    assert!(tables.samples.is_empty());
    assert_eq!(tables.blinks.len(), 1);
}

#[test]
fn corrupt_file_fails_only_its_family() {
    let dir = tempdir();
    write_file(dir.path(), "s1_Saccade.csv", SACCADE_HEADER, &["R,1,2,not-a-number,0,0,1,1,2,100"]);
    write_file(dir.path(), "s1_Blink.csv", BLINK_HEADER, &["R,10,40,30"]);

    let load = load_gaze_files(dir.path(), &PipelineConfig::default());
    assert!(load.saccades.is_err());
    assert_eq!(load.blinks.as_ref().unwrap().len(), 1);
    assert!(load.fixations.as_ref().unwrap().is_empty());
    assert!(load.into_tables().is_err());
}

#[test]
fn outlier_filters_applied_after_merge() {
    let dir = tempdir();
    write_file(dir.path(), "s1_Fixation.csv", FIXATION_HEADER, &[
        "R,0,40,40,0,0,0",      // duration at lower bound
        "R,100,300,200,0,0,0",  // kept
        "R,400,1400,1000,0,0,0" // duration at upper bound
    ]);
    write_file(dir.path(), "s1_Saccade.csv", SACCADE_HEADER, &[
        "R,0,30,30,0,0,1,1,2.5,5",     // vPeak == 5
        "R,40,70,30,0,0,1,1,2.5,1000", // vPeak == 1000
        "R,80,110,30,0,0,1,1,2.5,300", // kept
        "R,120,150,30,0,0,1,1,25,300", // amplitude too large
    ]);

    let tables = load_gaze_files(dir.path(), &PipelineConfig::default()).into_tables().unwrap();
    assert_eq!(tables.fixations.len(), 1);
    assert_eq!(tables.fixations[0].duration, 200.0);
    assert_eq!(tables.saccades.len(), 1);
    assert_eq!(tables.saccades[0].t_start, 80.0);
}

#[test]
fn sample_pupil_size_derived_and_filled() {
    let dir = tempdir();
    write_file(dir.path(), "s1_Sample.csv", SAMPLE_HEADER, &[
        "3,0,0,0,0,0,0",
        "1,0,0,0,0,0,0",
        "2,0,0,5,0,0,4",
        "4,0,0,7,0,0,6",
        "5,0,0,8,0,0,0",
        "6,0,0,9,0,0,8",
    ]);

    let tables = load_gaze_files(dir.path(), &PipelineConfig::default()).into_tables().unwrap();
    let s: &[Sample] = &tables.samples;
    let t: Vec<f64> = s.iter().map(|x| x.t_sample).collect();
    assert_eq!(t, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

    let p: Vec<f64> = s.iter().map(|x| x.pupil_size.unwrap()).collect();
    // t=1 leads → first valid (4); t=3 between 4 and 6 → 5; t=5 between 6 and 8 → 7.
    assert_eq!(p.len(), 6);
    approx::assert_abs_diff_eq!(p[0], 4.0);
    approx::assert_abs_diff_eq!(p[1], 4.0);
    approx::assert_abs_diff_eq!(p[2], 5.0, epsilon = 1e-12);
    approx::assert_abs_diff_eq!(p[3], 6.0);
    approx::assert_abs_diff_eq!(p[4], 7.0, epsilon = 1e-12);
    approx::assert_abs_diff_eq!(p[5], 8.0);
}

#[test]
fn merge_is_idempotent_on_loaded_table() {
    let dir = tempdir();
    write_file(dir.path(), "a_Blink.csv", BLINK_HEADER, &["R,30,40,10", "R,10,20,10", "R,30,40,10"]);
    let once: Vec<Blink> = load_family(dir.path(), "R").unwrap();
    let twice = merge_rows(once.clone()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn missing_directory_is_an_error() {
    let dir = tempdir();
    let gone = dir.path().join("nope");
    assert!(load_family::<Blink>(&gone, "R").is_err());
}

#[test]
fn empty_numeric_cells_fail_the_filters_not_the_family() {
    let dir = tempdir();
    write_file(dir.path(), "s1_Saccade.csv", SACCADE_HEADER, &[
        "R,80,110,30,0,0,1,1,2.5,300",
        "R,120,150,30,0,0,1,1,,", // amplitude and velocity missing
    ]);
    write_file(dir.path(), "s1_Fixation.csv", FIXATION_HEADER, &[
        "R,100,300,200,0,0,0",
        "R,400,,,0,0,0",
    ]);

    let tables = load_gaze_files(dir.path(), &PipelineConfig::default()).into_tables().unwrap();
    assert_eq!(tables.saccades.len(), 1);
    assert_eq!(tables.saccades[0].t_start, 80.0);
    assert_eq!(tables.fixations.len(), 1);
    assert_eq!(tables.fixations[0].t_start, 100.0);
}

#[test]
fn rows_differing_in_unmodeled_column_both_survive() {
    let dir = tempdir();
    let header = format!("{FIXATION_HEADER},trial");
    write_file(dir.path(), "s1_Fixation.csv", &header, &[
        "R,100,300,200,0,0,0,1",
        "R,100,300,200,0,0,0,2",
        "R,100,300,200,0,0,0,1",
    ]);

    let fix: Vec<Fixation> = load_family(dir.path(), "R").unwrap();
    let trials: Vec<&str> = fix.iter().map(|f| f.extra["trial"].as_str()).collect();
    assert_eq!(trials, vec!["1", "2"]);

    let out = dir.path().join("tagged.csv");
    gazeprep::io::write_gaze_rows(&out, &fix).unwrap();
    let lines = read_lines(&out);
    assert_eq!(lines[0], "eye,tStart,tEnd,duration,xAvg,yAvg,pupilAvg,event,trial");
    assert_eq!(lines[2], "R,100.0,300.0,200.0,0.0,0.0,0.0,,2");
}
