//! Trace rendering
//!
//! A dump takes one snapshot of the write index and walks the retained
//! window `[max(0, w - capacity), w)` oldest first. The index is not read
//! again while iterating, so records written meanwhile may show up torn
//! or stale. This is a diagnostic view, not a transactional log.

use core::fmt;

use super::event::TraceRecord;
use super::ring::TraceRing;

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Iterator over the retained window of a ring, oldest first
#[derive(Debug, Clone)]
pub struct Snapshot<'a> {
    ring: &'a TraceRing,
    next: u64,
    end: u64,
}

impl<'a> Snapshot<'a> {
    fn new(ring: &'a TraceRing) -> Self {
        let end = ring.written();
        let begin = end.saturating_sub(ring.capacity() as u64);
        Self {
            ring,
            next: begin,
            end,
        }
    }

    /// Logical index of the first record in the window
    pub fn first_index(&self) -> u64 {
        self.next
    }
}

impl Iterator for Snapshot<'_> {
    type Item = TraceRecord;

    fn next(&mut self) -> Option<TraceRecord> {
        if self.next >= self.end {
            return None;
        }
        let record = self.ring.read(self.next);
        self.next += 1;
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.end - self.next) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Snapshot<'_> {}

// ============================================================================
// DUMPER
// ============================================================================

/// Renders a trace ring as text lines
#[derive(Debug, Clone, Copy)]
pub struct Dumper<'a> {
    ring: &'a TraceRing,
}

impl<'a> Dumper<'a> {
    /// Dumper over `ring`
    pub fn new(ring: &'a TraceRing) -> Self {
        Self { ring }
    }

    /// Retained records, oldest first
    pub fn snapshot(&self) -> Snapshot<'a> {
        Snapshot::new(self.ring)
    }

    /// One `<timestamp> <kind-number> <value>` line per retained record
    #[inline(never)]
    pub fn dump_raw<W: fmt::Write + ?Sized>(&self, out: &mut W) -> fmt::Result {
        let snapshot = self.snapshot();
        log::debug!(
            "Trace: raw dump of {} records from index {}",
            snapshot.len(),
            snapshot.first_index()
        );
        for record in snapshot {
            writeln!(out, "{}", record.raw())?;
        }
        Ok(())
    }

    /// One `<timestamp> <kind-name> <value>` line per retained record
    #[inline(never)]
    pub fn dump_human<W: fmt::Write + ?Sized>(&self, out: &mut W) -> fmt::Result {
        let snapshot = self.snapshot();
        log::debug!(
            "Trace: human dump of {} records from index {}",
            snapshot.len(),
            snapshot.first_index()
        );
        for record in snapshot {
            writeln!(out, "{}", record.human())?;
        }
        Ok(())
    }
}
