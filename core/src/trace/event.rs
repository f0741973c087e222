//! Protocol event kinds and trace records

use core::fmt;

// ============================================================================
// EVENT KIND
// ============================================================================

/// Queue protocol step recorded in the trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventKind {
    /// Queue capacity set or changed; value is the new capacity
    SetCapacity    = 0,
    /// Producer claimed a slot; value is the tail index
    ReserveEnqueue = 1,
    /// Consumer claimed a slot; value is the head index
    ReserveDequeue = 2,
    /// Producer published a slot; value is the tail index
    CommitEnqueue  = 3,
    /// Consumer released a slot; value is the head index
    CommitDequeue  = 4,
    /// Producer started spinning on a full queue
    Full           = 5,
    /// Consumer started spinning on an empty queue
    Empty          = 6,
}

impl EventKind {
    /// Every kind, in numeric order
    pub const ALL: [EventKind; 7] = [
        EventKind::SetCapacity,
        EventKind::ReserveEnqueue,
        EventKind::ReserveDequeue,
        EventKind::CommitEnqueue,
        EventKind::CommitDequeue,
        EventKind::Full,
        EventKind::Empty,
    ];

    /// Decode a raw kind
    #[inline]
    pub fn from_raw(raw: u8) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    /// Numeric value used by raw dumps
    #[inline(always)]
    pub fn raw(self) -> u8 {
        self as u8
    }

    /// Name used by human-readable dumps
    pub fn name(self) -> &'static str {
        match self {
            EventKind::SetCapacity => "setCapacity",
            EventKind::ReserveEnqueue => "reserveEnqueue",
            EventKind::ReserveDequeue => "reserveDequeue",
            EventKind::CommitEnqueue => "commitEnqueue",
            EventKind::CommitDequeue => "commitDequeue",
            EventKind::Full => "full",
            EventKind::Empty => "empty",
        }
    }

    /// Singleton set holding this kind
    #[inline]
    pub fn bit(self) -> EventKinds {
        EventKinds::from_bits_truncate(1 << self.raw())
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// EVENT KIND SETS
// ============================================================================

bitflags::bitflags! {
    /// Set of event kinds, e.g. what a trace level records
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventKinds: u8 {
        /// Capacity changes
        const SET_CAPACITY    = 1 << 0;
        /// Producer slot claims
        const RESERVE_ENQUEUE = 1 << 1;
        /// Consumer slot claims
        const RESERVE_DEQUEUE = 1 << 2;
        /// Producer publications
        const COMMIT_ENQUEUE  = 1 << 3;
        /// Consumer releases
        const COMMIT_DEQUEUE  = 1 << 4;
        /// Full spin episodes
        const FULL            = 1 << 5;
        /// Empty spin episodes
        const EMPTY           = 1 << 6;

        /// Reserve/commit handshake events
        const HANDSHAKE = Self::RESERVE_ENQUEUE.bits()
            | Self::RESERVE_DEQUEUE.bits()
            | Self::COMMIT_ENQUEUE.bits()
            | Self::COMMIT_DEQUEUE.bits();
        /// Spin episode events
        const SPIN = Self::FULL.bits() | Self::EMPTY.bits();
    }
}

// ============================================================================
// TRACE RECORD
// ============================================================================

/// One entry of the trace ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord {
    /// Cycle count when the event was recorded
    pub timestamp: u64,
    /// Protocol step
    pub kind: EventKind,
    /// Index or capacity, depending on `kind`; a `usize` above `i64::MAX`
    /// is stored wrapped
    pub value: i64,
}

impl TraceRecord {
    /// Raw line form: `<timestamp> <kind-number> <value>`
    pub fn raw(&self) -> RawLine<'_> {
        RawLine(self)
    }

    /// Human line form: `<timestamp> <kind-name> <value>`
    pub fn human(&self) -> HumanLine<'_> {
        HumanLine(self)
    }
}

/// Raw rendering of a record
#[derive(Debug)]
pub struct RawLine<'a>(&'a TraceRecord);

impl fmt::Display for RawLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.0.timestamp, self.0.kind.raw(), self.0.value)
    }
}

/// Human-readable rendering of a record
#[derive(Debug)]
pub struct HumanLine<'a>(&'a TraceRecord);

impl fmt::Display for HumanLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.0.timestamp, self.0.kind.name(), self.0.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_numbering() {
        for (i, kind) in EventKind::ALL.iter().enumerate() {
            assert_eq!(kind.raw() as usize, i);
            assert_eq!(EventKind::from_raw(i as u8), Some(*kind));
        }
        assert_eq!(EventKind::from_raw(7), None);
    }

    #[test]
    fn test_kind_names() {
        let names: Vec<&str> = EventKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(
            names,
            [
                "setCapacity",
                "reserveEnqueue",
                "reserveDequeue",
                "commitEnqueue",
                "commitDequeue",
                "full",
                "empty"
            ]
        );
    }

    #[test]
    fn test_kind_bits() {
        let all = EventKind::ALL
            .iter()
            .fold(EventKinds::empty(), |acc, k| acc | k.bit());
        assert_eq!(all, EventKinds::all());
        assert_eq!(
            EventKinds::SET_CAPACITY | EventKinds::HANDSHAKE | EventKinds::SPIN,
            EventKinds::all()
        );
        assert_eq!(EventKind::Full.bit(), EventKinds::FULL);
    }

    #[test]
    fn test_record_lines() {
        let record = TraceRecord {
            timestamp: 12345,
            kind: EventKind::CommitDequeue,
            value: -7,
        };
        assert_eq!(record.raw().to_string(), "12345 4 -7");
        assert_eq!(record.human().to_string(), "12345 commitDequeue -7");
    }
}
