/// Shared helpers for on-disk fixtures.
use std::path::Path;
use tempfile::TempDir;

pub fn tempdir() -> TempDir {
    tempfile::tempdir().expect("creating temp dir")
}

/// Write `header` + `rows` (already delimited) to `dir/name`.
pub fn write_file(dir: &Path, name: &str, header: &str, rows: &[&str]) {
    let mut body = String::from(header);
    body.push('\n');
    for r in rows {
        body.push_str(r);
        body.push('\n');
    }
    std::fs::write(dir.join(name), body)
        .unwrap_or_else(|e| panic!("writing fixture {name}: {e}"));
}

#[allow(unused)]
pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_else(|_| panic!("output not found: {}", path.display()))
        .lines()
        .map(String::from)
        .collect()
}

#[allow(unused)]
pub const FIXATION_HEADER: &str = "eye,tStart,tEnd,duration,xAvg,yAvg,pupilAvg";
#[allow(unused)]
pub const SACCADE_HEADER: &str = "eye,tStart,tEnd,duration,xStart,yStart,xEnd,yEnd,ampDeg,vPeak";
#[allow(unused)]
pub const BLINK_HEADER: &str = "eye,tStart,tEnd,duration";
#[allow(unused)]
pub const SAMPLE_HEADER: &str = "tSample,LX,LY,LPupil,RX,RY,RPupil";
#[allow(unused)]
pub const EVENTS_HEADER: &str = "Text,VAL,PageNum,eye_sample,duration_sec,EVENT";
