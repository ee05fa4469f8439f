use super::*;
use crate::error::ProgressError;
use crate::line::LineClassifier;

const ROOT: &str = "/home/the_source";

struct Harness {
    classifier: LineClassifier,
    aggregator: SessionAggregator,
    last: Option<Snapshot>,
}

impl Harness {
    fn new(config: SessionConfig) -> Self {
        Self {
            classifier: LineClassifier::new(ROOT),
            aggregator: SessionAggregator::new(config),
            last: None,
        }
    }

    fn push(&mut self, fragment: &str) -> ProgressResult<Snapshot> {
        let line = self.classifier.classify(fragment)?;
        let next = self.aggregator.advance(self.last.as_ref(), &line)?;
        self.last = Some(next.clone());
        Ok(next)
    }

    fn push_ok(&mut self, fragment: &str) -> Snapshot {
        self.push(fragment).expect("fragment is valid")
    }
}

#[test]
fn empty_snapshot_has_nothing() {
    let snapshot = Snapshot::default();
    assert_eq!(snapshot.total_transferred(), 0);
    assert!(snapshot.completed_paths().is_empty());
    assert!(snapshot.raw_output().is_empty());
    assert_eq!(snapshot.transferring_path(), None);
}

#[test]
fn path_announcement_sets_transferring_path() {
    let mut harness = Harness::new(SessionConfig::default());

    let root = harness.push_ok("the_source\n");
    assert_eq!(root.transferring_path(), Some(Path::new(ROOT)));

    let nested = harness.push_ok("the_source/sub/file.bin\n");
    assert_eq!(
        nested.transferring_path(),
        Some(Path::new("/home/the_source/sub/file.bin"))
    );
    assert_eq!(nested.total_transferred(), 0);
}

#[test]
fn progress_reading_is_only_kept_for_its_own_snapshot() {
    let mut harness = Harness::new(SessionConfig::default());
    harness.push_ok("the_source\n");

    let reading = harness.push_ok("     32,768   0%    0.00kB/s    0:00:00\r");
    assert_eq!(
        reading.in_progress_stats().map(TransferStats::transferred_bytes),
        Some(32_768)
    );
    assert_eq!(reading.total_transferred(), 32_768);

    let marker = harness.push_ok("\n");
    assert_eq!(marker.in_progress_stats(), None);
    assert_eq!(marker.total_transferred(), 32_768);
    assert_eq!(marker.transferring_path(), Some(Path::new(ROOT)));
}

#[test]
fn completed_reading_enters_ledger() {
    let mut harness = Harness::new(SessionConfig::default());
    harness.push_ok("/a.bin\n");
    harness.push_ok("        100  10%    1.00kB/s    0:00:01\r");
    let done = harness.push_ok("      1,000 100%    1.00kB/s    0:00:01 (xfr#1, to-chk=1/2)\n");

    let path = Path::new("/home/the_source/a.bin");
    assert_eq!(done.last_completed_path(), Some(path));
    assert_eq!(
        done.last_completed_path_stats()
            .map(TransferStats::transferred_bytes),
        Some(1_000)
    );
    assert_eq!(done.in_progress_stats(), None);
    assert_eq!(done.completed_paths().len(), 1);
    assert!(done.completed_paths()[path].is_completed());
    assert_eq!(done.total_transferred(), 1_000);
}

#[test]
fn totals_accumulate_across_files() {
    let mut harness = Harness::new(SessionConfig::default());
    harness.push_ok("/a\n");
    harness.push_ok("100 10%  1.00kB/s    0:00:01\r");
    harness.push_ok("250 100%  1.00kB/s    0:00:01\r");
    harness.push_ok("250 100%  1.00kB/s    0:00:01 (xfr#1, to-chk=1/2)\n");
    harness.push_ok("/b\n");
    let first = harness.push_ok("50 10%  1.00kB/s    0:00:01\r");
    let second = harness.push_ok("120 24%  1.00kB/s    0:00:01\r");

    assert_eq!(first.total_transferred(), 300);
    assert_eq!(second.total_transferred(), 370);
    assert_eq!(
        second.last_completed_path(),
        Some(Path::new("/home/the_source/a"))
    );
    assert_eq!(second.transferring_path(), Some(Path::new("/home/the_source/b")));
}

#[test]
fn reading_before_any_path_is_a_protocol_violation() {
    let mut harness = Harness::new(SessionConfig::default());
    harness.push_ok("sending incremental file list\n");

    let err = harness
        .push("     32,768   0%    0.00kB/s    0:00:00\r")
        .expect_err("no path announced yet");
    assert!(matches!(
        err,
        ProgressError::Protocol(ProtocolViolation::StatsBeforePath { .. })
    ));
}

#[test]
fn unclassifiable_line_is_rejected() {
    let mut harness = Harness::new(SessionConfig::default());
    let err = harness.push("???garbage???\n").expect_err("garbage");
    assert_eq!(
        err,
        ProgressError::Protocol(ProtocolViolation::UnclassifiableLine {
            fragment: "???garbage???\n".to_owned()
        })
    );
}

#[test]
fn previous_snapshot_is_left_untouched() {
    let mut harness = Harness::new(SessionConfig::default().with_raw_output(true));
    harness.push_ok("/a\n");
    let before = harness.push_ok("1 100%  1.00kB/s    0:00:01 (xfr#1, to-chk=1/2)\n");
    let frozen = before.clone();

    harness.push_ok("/b\n");
    let after = harness.push_ok("2 100%  1.00kB/s    0:00:01 (xfr#2, to-chk=0/2)\n");

    assert_eq!(before, frozen);
    assert_eq!(before.completed_paths().len(), 1);
    assert_eq!(after.completed_paths().len(), 2);
    assert_eq!(before.raw_output().len(), 2);
    assert_eq!(after.raw_output().len(), 4);
}

#[test]
fn ledger_is_shared_until_it_changes() {
    let mut harness = Harness::new(SessionConfig::default());
    harness.push_ok("/a\n");
    let completed = harness.push_ok("1 100%  1.00kB/s    0:00:01 (xfr#1, to-chk=1/2)\n");
    let announced = harness.push_ok("/b\n");
    let reading = harness.push_ok("1 50%  1.00kB/s    0:00:01\r");

    assert!(completed.shares_ledger_with(&announced));
    assert!(announced.shares_ledger_with(&reading));
}

fn completed_transcript(harness: &mut Harness, files: usize) -> Snapshot {
    let mut last = Snapshot::default();
    for index in 0..files {
        harness.push_ok(&format!("/data/file-{index:05}\n"));
        last = harness.push_ok("10 100%  1.00kB/s    0:00:01 (xfr#1, to-chk=0/1)\n");
    }
    last
}

fn buffer_of(text: &std::ffi::OsStr) -> *const u8 {
    text.as_encoded_bytes().as_ptr()
}

#[test]
fn one_more_completion_keeps_earlier_entries_in_place() {
    let mut harness = Harness::new(SessionConfig::default().with_raw_output(true));
    let before = completed_transcript(&mut harness, 2_000);
    assert_eq!(before.completed_paths().len(), 2_000);

    harness.push_ok("/data/zz-last\n");
    let after = harness.push_ok("10 100%  1.00kB/s    0:00:01 (xfr#1, to-chk=0/1)\n");
    assert_eq!(after.completed_paths().len(), 2_001);
    assert_eq!(before.completed_paths().len(), 2_000);

    let same_keys = before
        .completed_paths()
        .keys()
        .zip(after.completed_paths().keys())
        .filter(|(old, new)| buffer_of(old.as_os_str()) == buffer_of(new.as_os_str()))
        .count();
    assert!(same_keys >= 2_000 - 128, "only {same_keys} ledger keys shared");

    let same_fragments = before
        .raw_output()
        .iter()
        .zip(after.raw_output().iter())
        .filter(|(old, new)| old.as_ptr() == new.as_ptr())
        .count();
    assert!(
        same_fragments >= before.raw_output().len() - 128,
        "only {same_fragments} history entries shared"
    );
}

#[test]
fn raw_output_is_retained_only_when_enabled() {
    let mut without = Harness::new(SessionConfig::default());
    let mut with = Harness::new(SessionConfig::default().with_raw_output(true));
    for fragment in ["sending incremental file list\n", "the_source\n"] {
        without.push_ok(fragment);
        with.push_ok(fragment);
    }

    let without = without.last.expect("snapshots emitted");
    let with = with.last.expect("snapshots emitted");
    assert!(without.raw_output().is_empty());
    let history: Vec<&str> = with.raw_output().iter().map(String::as_str).collect();
    assert_eq!(history, ["sending incremental file list\n", "the_source\n"]);
}

#[test]
fn diagnostic_is_recorded_without_disturbing_the_transfer() {
    let mut harness = Harness::new(SessionConfig::default());
    harness.push_ok("/a\n");
    let reading = harness.push_ok("1 50%  1.00kB/s    0:00:01\r");
    let warned = harness.push_ok("file has vanished: \"/home/the_source/b\"\n");

    assert_eq!(warned.in_progress_stats(), None);
    assert_eq!(warned.transferring_path(), reading.transferring_path());
    assert_eq!(warned.total_transferred(), reading.total_transferred());
    assert!(warned.shares_ledger_with(&reading));
    assert!(reading.diagnostics().is_empty());
    let messages: Vec<&str> = warned.diagnostics().iter().map(String::as_str).collect();
    assert_eq!(messages, ["file has vanished: \"/home/the_source/b\""]);
}

#[test]
fn aggregator_reports_its_config() {
    let config = SessionConfig::default().with_raw_output(true);
    assert_eq!(SessionAggregator::new(config).config(), config);
}
