use crossbeam::channel::{Receiver, Sender, unbounded};
use std::path::PathBuf;
use tracing::{info, warn};

/// Progress and failure notifications emitted while datasets are processed.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    DatasetStarted {
        path: PathBuf,
    },
    RowsRead {
        path: PathBuf,
        rows: usize,
        skipped: usize,
    },
    ColumnSelected {
        path: PathBuf,
        column: String,
    },
    /// `row` is zero-based over data rows of `path`.
    ValueRejected {
        path: PathBuf,
        row: usize,
        value: String,
        error: String,
    },
    DatasetWritten {
        path: PathBuf,
        output: PathBuf,
        rows: usize,
    },
    DatasetFailed {
        path: PathBuf,
        error: String,
    },
}

pub trait Reporter {
    fn report(&self, event: Event);
}

/// Renders events through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, event: Event) {
        match event {
            Event::DatasetStarted { path } => info!(path = %path.display(), "processing"),
            Event::RowsRead {
                path,
                rows,
                skipped,
            } => {
                info!(path = %path.display(), rows, "read rows");
                if skipped > 0 {
                    warn!(path = %path.display(), skipped, "skipped malformed rows");
                }
            }
            Event::ColumnSelected { path, column } => {
                info!(path = %path.display(), %column, "timestamp column selected")
            }
            Event::ValueRejected {
                path,
                row,
                value,
                error,
            } => {
                warn!(path = %path.display(), row, %value, %error, "failed to parse timestamp")
            }
            Event::DatasetWritten { path, output, rows } => {
                info!(path = %path.display(), output = %output.display(), rows, "saved")
            }
            Event::DatasetFailed { path, error } => {
                warn!(path = %path.display(), %error, "dataset failed")
            }
        }
    }
}

/// Forwards events to a channel so another thread (or a test) can consume them.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    tx: Sender<Event>,
}

impl ChannelReporter {
    pub fn new() -> (Self, Receiver<Event>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }
}

impl Reporter for ChannelReporter {
    fn report(&self, event: Event) {
        // receiver gone means nobody is listening anymore
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn channel_reporter_preserves_order() {
        let (reporter, rx) = ChannelReporter::new();
        reporter.report(Event::DatasetStarted {
            path: PathBuf::from("a.csv"),
        });
        reporter.report(Event::ValueRejected {
            path: PathBuf::from("a.csv"),
            row: 3,
            value: "x".into(),
            error: "bad".into(),
        });
        drop(reporter);

        let events: Vec<Event> = rx.iter().collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[1],
            Event::ValueRejected { path, row: 3, .. } if path == Path::new("a.csv")
        ));
    }

    #[test]
    fn channel_reporter_tolerates_dropped_receiver() {
        let (reporter, rx) = ChannelReporter::new();
        drop(rx);
        reporter.report(Event::DatasetStarted {
            path: PathBuf::from("a.csv"),
        });
    }
}
