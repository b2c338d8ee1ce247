//! Event-to-sample alignment.
//!
//! Experimental events (page onsets with a duration) are projected onto a
//! continuous gaze timeline.  For each event, in input order:
//!
//! ```text
//! start_idx  = nearest(tStart, event.eye_sample)
//! end_time   = tStart[start_idx] + duration_sec * 1000
//! end_idx    = nearest(tEnd, end_time)
//! windows start_idx+1 ..= end_idx  ← event label
//! ```
//!
//! A later event overwrites an earlier one where their ranges overlap.
//! Windows no event claimed are dropped from the output.
use crate::nearest::find_nearest;

/// One event to align.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Label written to the `event` column of claimed windows.
    pub label: String,
    /// Onset timestamp (ms, same clock as the gaze tables).
    pub eye_sample: f64,
    /// Duration in seconds.
    pub duration_sec: f64,
}

impl Event {
    pub fn new(label: impl Into<String>, eye_sample: f64, duration_sec: f64) -> Self {
        Self { label: label.into(), eye_sample, duration_sec }
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_sec * 1000.0
    }
}

/// A gaze record occupying `[t_start, t_end]` that can carry an event label.
pub trait SampleWindow {
    fn t_start(&self) -> f64;
    fn t_end(&self) -> f64;
    fn event(&self) -> Option<&str>;
    fn set_event(&mut self, label: &str);
}

/// For every window, the index of the event that claimed it (last writer wins).
///
/// `starts` and `ends` are the `tStart` / `tEnd` series of the windows and must
/// have equal length.  Empty input yields an empty assignment.
pub fn assign_events(events: &[Event], starts: &[f64], ends: &[f64]) -> Vec<Option<usize>> {
    assert_eq!(starts.len(), ends.len(), "tStart / tEnd length mismatch");
    let mut owner = vec![None; starts.len()];
    if starts.is_empty() {
        return owner;
    }

    for (e, ev) in events.iter().enumerate() {
        let (start_time, start_idx) = find_nearest(starts, ev.eye_sample);
        let (_, end_idx) = find_nearest(ends, start_time + ev.duration_ms());
        if start_idx >= end_idx {
            tracing::trace!(event = ev.label.as_str(), start_idx, end_idx, "align: empty range");
            continue;
        }
        for slot in &mut owner[start_idx + 1..=end_idx] {
            *slot = Some(e);
        }
    }
    owner
}

/// Tag `records` with the events that cover them and keep only tagged ones.
///
/// Record order is preserved.  Any label a record carried on input is
/// replaced (claimed records) or discarded together with the record.
///
/// # Examples
///
/// ```
/// use gazeprep::align::{tag_events, Event, SampleWindow};
/// use gazeprep::gaze::Fixation;
///
/// let fix = |t0: f64, t1: f64| Fixation { t_start: t0, t_end: t1, duration: t1 - t0, ..Default::default() };
/// let records = vec![fix(0.0, 90.0), fix(100.0, 180.0), fix(200.0, 290.0), fix(300.0, 390.0)];
///
/// // Onset 0 → start_idx 0; end 0 + 300 ms → nearest tEnd is 290 (idx 2).
/// let tagged = tag_events(&[Event::new("page1", 0.0, 0.3)], records);
/// assert_eq!(tagged.len(), 2);
/// assert_eq!(tagged[0].t_start, 100.0);
/// assert_eq!(tagged[1].event(), Some("page1"));
/// ```
pub fn tag_events<T: SampleWindow>(events: &[Event], records: Vec<T>) -> Vec<T> {
    let starts: Vec<f64> = records.iter().map(SampleWindow::t_start).collect();
    let ends: Vec<f64> = records.iter().map(SampleWindow::t_end).collect();
    let owner = assign_events(events, &starts, &ends);

    let n_in = records.len();
    let tagged: Vec<T> = records
        .into_iter()
        .zip(owner)
        .filter_map(|(mut rec, who)| {
            let e = who?;
            rec.set_event(&events[e].label);
            Some(rec)
        })
        .collect();

    tracing::debug!(
        n_events = events.len(),
        n_records = n_in,
        n_tagged = tagged.len(),
        "align: tagged records"
    );
    tagged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct W {
        t0: f64,
        t1: f64,
        event: Option<String>,
    }

    impl SampleWindow for W {
        fn t_start(&self) -> f64 { self.t0 }
        fn t_end(&self) -> f64 { self.t1 }
        fn event(&self) -> Option<&str> { self.event.as_deref() }
        fn set_event(&mut self, label: &str) { self.event = Some(label.to_string()) }
    }

    fn windows(spans: &[(f64, f64)]) -> Vec<W> {
        spans.iter().map(|&(t0, t1)| W { t0, t1, event: None }).collect()
    }

    /// 1 ms samples at t = 0..n.
    fn ms_samples(n: usize) -> Vec<W> {
        (0..n).map(|t| W { t0: t as f64, t1: t as f64, event: None }).collect()
    }

    #[test]
    fn short_event_collapses_to_nothing() {
        // Onset 100 → start idx 1 (tStart 100); end 110 → tEnd 110 is idx 0.
        let data = windows(&[(90.0, 110.0), (100.0, 120.0), (110.0, 130.0)]);
        let out = tag_events(&[Event::new("p", 100.0, 0.01)], data);
        assert!(out.is_empty());
    }

    #[test]
    fn range_excludes_start_includes_end() {
        let data = ms_samples(50);
        // Onset 10, 5 ms → samples 11..=15.
        let out = tag_events(&[Event::new("p", 10.0, 0.005)], data);
        let ts: Vec<f64> = out.iter().map(|w| w.t0).collect();
        assert_eq!(ts, vec![11.0, 12.0, 13.0, 14.0, 15.0]);
        assert!(out.iter().all(|w| w.event.as_deref() == Some("p")));
    }

    #[test]
    fn later_event_wins_overlap() {
        let data = ms_samples(30);
        let events = [Event::new("a", 0.0, 0.010), Event::new("b", 5.0, 0.010)];
        let owner = assign_events(
            &events,
            &data.iter().map(|w| w.t0).collect::<Vec<_>>(),
            &data.iter().map(|w| w.t1).collect::<Vec<_>>(),
        );
        assert_eq!(owner[0], None);
        assert_eq!(owner[5], Some(0));
        assert_eq!(owner[6], Some(1));
        assert_eq!(owner[15], Some(1));
        assert_eq!(owner[16], None);

        // Reversed order gives "a" the overlap.
        let rev = [events[1].clone(), events[0].clone()];
        let out = tag_events(&rev, data);
        let at6 = out.iter().find(|w| w.t0 == 6.0).unwrap();
        assert_eq!(at6.event.as_deref(), Some("a"));
    }

    #[test]
    fn onset_beyond_timeline_is_noop() {
        let out = tag_events(&[Event::new("late", 1e6, 1.0)], ms_samples(10));
        assert!(out.is_empty());
    }

    #[test]
    fn empty_records_and_empty_events() {
        let out: Vec<W> = tag_events(&[Event::new("p", 0.0, 1.0)], vec![]);
        assert!(out.is_empty());
        assert!(tag_events(&[], ms_samples(5)).is_empty());
    }

    #[test]
    fn untagged_input_label_is_not_kept() {
        let mut data = ms_samples(10);
        data[9].event = Some("stale".into());
        let out = tag_events(&[Event::new("p", 0.0, 0.003)], data);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|w| w.event() == Some("p")));
    }
}
