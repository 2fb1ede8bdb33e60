//! Request sequencing
//!
//! Completions are not ordered relative to issue order, so every fetch carries
//! a ticket and only the latest ticket per fetch kind is allowed to land.

/// Logical fetch slots; each has its own sequence counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    Catalog,
    Summary,
    Chart,
    Gaps,
    ZoneDetail,
    BoroughDetail,
    Report,
}

impl FetchKind {
    pub const ALL: [FetchKind; 7] = [
        FetchKind::Catalog,
        FetchKind::Summary,
        FetchKind::Chart,
        FetchKind::Gaps,
        FetchKind::ZoneDetail,
        FetchKind::BoroughDetail,
        FetchKind::Report,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub kind: FetchKind,
    pub seq: u64,
}

#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: [u64; FetchKind::ALL.len()],
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next ticket for `kind`, superseding every earlier one
    pub fn issue(&mut self, kind: FetchKind) -> Ticket {
        let slot = &mut self.latest[kind.slot()];
        *slot += 1;
        Ticket { kind, seq: *slot }
    }

    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.latest[ticket.kind.slot()] == ticket.seq
    }

    /// Invalidate any outstanding ticket for `kind` without issuing a request
    pub fn supersede(&mut self, kind: FetchKind) {
        self.latest[kind.slot()] += 1;
    }
}
