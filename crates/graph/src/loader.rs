use crate::error::Result;
use crate::types::{ChannelGraph, LinkInfo};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One line of the newline-delimited reference dump
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReference {
    from: String,
    from_name: String,
    to: String,
    to_name: String,
    message_link: String,
    message_date: String,
}

/// Counters for what the loader kept and dropped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Records that made it into the graph
    pub loaded: usize,

    /// Records skipped because an endpoint's name equals its id
    pub private_skipped: usize,

    /// Lines that failed to parse as a reference record
    pub malformed: usize,
}

/// Build a [`ChannelGraph`] from a newline-delimited reference dump on disk.
///
/// Only failing to read the file is an error; individual bad lines are
/// skipped and counted in the returned [`LoadStats`].
pub fn load_path(path: impl AsRef<Path>) -> Result<(ChannelGraph, LoadStats)> {
    let file = File::open(path)?;
    load_reader(BufReader::new(file))
}

/// Build a [`ChannelGraph`] from any buffered reader of the dump format.
pub fn load_reader(reader: impl BufRead) -> Result<(ChannelGraph, LoadStats)> {
    let mut ingest = Ingest::new();
    for line in reader.lines() {
        ingest.line(&line?);
    }
    Ok(ingest.finish())
}

/// Build a [`ChannelGraph`] from an in-memory dump. Cannot fail: every
/// problem an individual line can have is a skip, not an error.
pub fn load_str(content: &str) -> (ChannelGraph, LoadStats) {
    let mut ingest = Ingest::new();
    for line in content.lines() {
        ingest.line(line);
    }
    ingest.finish()
}

/// Accumulates records during a load pass
struct Ingest {
    graph: ChannelGraph,
    stats: LoadStats,
}

impl Ingest {
    fn new() -> Self {
        Self {
            graph: ChannelGraph::new(),
            stats: LoadStats::default(),
        }
    }

    fn line(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }

        let record: RawReference = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(err) => {
                log::debug!("Skipping malformed line: {}", err);
                self.stats.malformed += 1;
                return;
            }
        };

        self.record(record);
    }

    fn record(&mut self, record: RawReference) {
        // name == id marks a private or archived channel
        if record.from_name == record.from || record.to_name == record.to {
            self.stats.private_skipped += 1;
            return;
        }

        let from = self.graph.ensure_channel(&record.from, &record.from_name);
        let to = self.graph.ensure_channel(&record.to, &record.to_name);

        self.graph.add_reference(
            from,
            to,
            LinkInfo {
                message_link: record.message_link,
                message_date: record.message_date,
            },
        );
        self.stats.loaded += 1;
    }

    fn finish(mut self) -> (ChannelGraph, LoadStats) {
        self.graph.finalize();

        log::info!(
            "Built channel graph: {} channels, {} references ({} private, {} malformed skipped)",
            self.graph.node_count(),
            self.graph.edge_count(),
            self.stats.private_skipped,
            self.stats.malformed
        );

        (self.graph, self.stats)
    }
}
