//! Shared record file coordination.
//!
//! ```text
//!  Save:                                   Playback:
//!  ┌──────────┐                            ┌──────────┐   own cursor
//!  │ env loop │──┐                         │ env loop │◀── File (E lines)
//!  │ T loop   │──┤  Record   ┌─────────┐   │ T loop   │◀── File (T lines)
//!  │ H loop   │──┼─────────▶ │ writer  │   │ H loop   │◀── File (H lines)
//!  │ M loop   │──┘  channel  │ thread  │   │ M loop   │◀── File (M lines)
//!  └──────────┘              └────┬────┘   └──────────┘
//!                                 ▼
//!                           append-only file
//! ```
//!
//! Saving: the orchestrator opens the output once.  Loops hand whole
//! [`Record`] values to a single writer thread, so lines can never
//! interleave.  No ordering is guaranteed between subsystems.
//!
//! Playback: every loop opens its own reader on the same path and scans
//! for its own tag at its own pace.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use log::{debug, info, warn};

use crate::app::ports::DisplayPort;
use crate::error::{Result, SimError};
use crate::record::{Record, tag_of};
use crate::sensors::SubsystemId;

// ───────────────────────────────────────────────────────────────
// Save path
// ───────────────────────────────────────────────────────────────

/// Cloneable handle a worker loop uses to append records.
#[derive(Clone)]
pub struct RecordSink {
    tx: Sender<Record>,
}

impl RecordSink {
    /// Queue one record for writing.  Fails only if the writer is gone.
    pub fn append(&self, record: Record) -> io::Result<()> {
        self.tx.send(record).map_err(|_| {
            io::Error::new(io::ErrorKind::BrokenPipe, "record writer has shut down")
        })
    }

    /// A sink whose writer is already gone.
    #[cfg(test)]
    pub(crate) fn detached() -> Self {
        let (tx, _) = crossbeam_channel::unbounded();
        Self { tx }
    }
}

/// Owner of the output file and its dedicated writer thread.
pub struct RecordWriter {
    path: PathBuf,
    tx: Option<Sender<Record>>,
    handle: Option<JoinHandle<()>>,
}

impl RecordWriter {
    /// Open `path` for appending and start the writer thread.
    ///
    /// Write failures are reported through `display` against the
    /// subsystem whose record was lost; the writer keeps going.
    pub fn create(path: impl AsRef<Path>, display: Arc<dyn DisplayPort>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| SimError::io("open save file", &path, e))?;

        let (tx, rx) = crossbeam_channel::unbounded();
        let out = BufWriter::new(file);
        let handle = thread::Builder::new()
            .name("record-writer".into())
            .spawn(move || write_loop(&rx, out, display.as_ref()))
            .map_err(|source| SimError::Spawn {
                name: "record-writer".into(),
                source,
            })?;

        info!("Saving records to {}", path.display());
        Ok(Self {
            path,
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A new append handle, or `None` once closed.
    pub fn sink(&self) -> Option<RecordSink> {
        self.tx.as_ref().map(|tx| RecordSink { tx: tx.clone() })
    }

    /// Stop accepting records and wait for the writer to drain.
    ///
    /// The writer exits only once every [`RecordSink`] has been dropped,
    /// so close the worker loops first.  Never fails.
    pub fn close(&mut self) {
        self.tx = None;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Record writer thread panicked");
            }
            debug!("Record writer closed ({})", self.path.display());
        }
    }
}

impl Drop for RecordWriter {
    fn drop(&mut self) {
        self.close();
    }
}

fn write_loop(rx: &Receiver<Record>, mut out: BufWriter<File>, display: &dyn DisplayPort) {
    let mut written: u64 = 0;
    for record in rx {
        match writeln!(out, "{record}").and_then(|()| out.flush()) {
            Ok(()) => written += 1,
            Err(e) => {
                warn!("Record write failed for {}: {}", record.subsystem(), e);
                display.display_error(record.subsystem(), &format!("could not save record: {e}"));
            }
        }
    }
    if let Err(e) = out.flush() {
        warn!("Final flush of record file failed: {}", e);
    }
    debug!("Record writer drained after {} records", written);
}

// ───────────────────────────────────────────────────────────────
// Playback path
// ───────────────────────────────────────────────────────────────

/// Independent reader over a saved run.
pub struct PlaybackReader {
    path: PathBuf,
    lines: io::Lines<BufReader<File>>,
    line_no: usize,
}

impl PlaybackReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| SimError::io("open playback file", &path, e))?;
        Ok(Self {
            path,
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Next record tagged for `id`, or `None` at end of input.
    ///
    /// Lines for other subsystems and unknown tags are skipped without
    /// being parsed.  A malformed line for `id` is an error.
    pub fn next_for(&mut self, id: SubsystemId) -> Result<Option<Record>> {
        for line in self.lines.by_ref() {
            self.line_no += 1;
            let line = line.map_err(|e| SimError::io("read playback file", &self.path, e))?;
            if tag_of(&line) != Some(id) {
                continue;
            }
            match Record::decode(&line) {
                Ok(Some(record)) => return Ok(Some(record)),
                Ok(None) => continue,
                Err(e) => return Err(e.at_line(self.line_no).into()),
            }
        }
        Ok(None)
    }
}
