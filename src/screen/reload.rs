/// Hands out reload tickets and remembers which one the rows currently reflect.
///
/// Only the most recently issued ticket may be applied; anything older resolved
/// too late and is dropped, whatever order the results arrive in.
#[derive(Debug, Default)]
pub struct ReloadTracker {
    issued: u64,
    settled: u64,
}

impl ReloadTracker {
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    pub fn latest(&self) -> u64 {
        self.issued
    }

    pub fn is_latest(&self, ticket: u64) -> bool {
        ticket == self.issued
    }

    /// Marks the latest ticket as resolved. Stale tickets are ignored.
    pub fn settle(&mut self, ticket: u64) {
        if self.is_latest(ticket) {
            self.settled = ticket;
        }
    }

    /// True while the latest issued reload has not resolved.
    pub fn pending(&self) -> bool {
        self.settled < self.issued
    }
}
