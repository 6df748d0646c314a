//! Draw trigger predicate.

use solana_program::clock::UnixTimestamp;

use crate::state::RaffleState;

/// Values the trigger looks at, captured at evaluation time
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpkeepSnapshot {
    pub now: UnixTimestamp,
    pub last_draw_timestamp: UnixTimestamp,
    pub interval: UnixTimestamp,
    pub state: RaffleState,
    pub balance: u64,
    pub participants: u32,
}

impl UpkeepSnapshot {
    /// A clock that reads earlier than the last draw never counts as elapsed.
    pub fn interval_elapsed(&self) -> bool {
        self.now
            .checked_sub(self.last_draw_timestamp)
            .map_or(false, |elapsed| elapsed >= 0 && elapsed >= self.interval)
    }
}

/// True only when the interval has elapsed, the raffle is open, and it holds
/// both a balance and at least one participant.
pub fn upkeep_needed(snapshot: &UpkeepSnapshot) -> bool {
    snapshot.interval_elapsed()
        && snapshot.state == RaffleState::Open
        && snapshot.balance > 0
        && snapshot.participants > 0
}
