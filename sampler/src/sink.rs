//! Sink adapters shaping completed runs for persistence.
//!
//! Two structured outputs: a CSV-style log appended one row per unified
//! loop iteration, and a JSON dump of the full run written once the window
//! closes. Chart rendering is an external consumer of these files and is
//! not handled here.

use std::fs::File;
use std::path::Path;

use serde_json::json;

use crate::error::Result;
use crate::scheduler::PollRow;
use crate::series::{Metric, Run};

pub const LOG_HEADER: [&str; 5] = [
    "Timestamp",
    "CPU_Usage(%)",
    "Memory_Usage(%)",
    "Latency(s)",
    "Throughput(Bytes/sec)",
];

/// Append-per-iteration CSV log with the compatibility header.
pub struct LogSink {
    writer: csv::Writer<File>,
}

impl LogSink {
    /// Create (truncating) the log file and write the header row.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut writer = csv::Writer::from_writer(File::create(path)?);
        writer.write_record(LOG_HEADER)?;
        writer.flush()?;
        Ok(Self { writer })
    }

    /// Append one aligned row. Flushed immediately so the log survives an
    /// interrupted run.
    pub fn append(&mut self, row: &PollRow) -> Result<()> {
        self.writer.write_record([
            format!("{:.2}", row.elapsed_secs),
            format!("{:.2}", row.cpu),
            format!("{:.2}", row.memory),
            format!("{:.4}", row.latency_secs),
            format!("{:.2}", row.throughput),
        ])?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Write the full run as JSON keyed by metric wire name plus the shared
/// `timestamps` and `attack_phases` sequences.
pub fn write_json<P: AsRef<Path>>(path: P, run: &Run) -> Result<()> {
    let mut dump = serde_json::Map::new();
    dump.insert("started_at".into(), json!(run.started_at.to_rfc3339()));
    for metric in Metric::ALL {
        dump.insert(
            metric.wire_name().into(),
            json!(run.series(metric).values()),
        );
    }
    dump.insert("timestamps".into(), json!(run.timestamps));
    dump.insert("attack_phases".into(), json!(run.attack_phases));
    let dump = serde_json::Value::Object(dump);

    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &dump)?;
    Ok(())
}
