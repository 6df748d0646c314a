//! Draw lifecycle of a raffle: entry, trigger and randomness fulfillment.
//!
//! The state is flipped before every external call: to `Drawing` before the
//! randomness request goes out and back to `Open` before the payout is made,
//! so nothing can enter or trigger a second draw while one is in flight.

use solana_program::{clock::UnixTimestamp, msg, pubkey::Pubkey};

use crate::{
    error::RaffleError,
    events::RaffleEvent,
    payout::PayoutExecutor,
    state::{DrawRecord, Raffle, RaffleConfig, RaffleState},
    upkeep::{upkeep_needed, UpkeepSnapshot},
    vrf::{winner_index, RandomnessOracle},
};

impl Raffle {
    /// Creates an open raffle whose first interval starts at `now`.
    pub fn new(config: RaffleConfig, now: UnixTimestamp) -> Result<Self, RaffleError> {
        config.validate()?;
        Ok(Self {
            is_initialized: true,
            config,
            state: RaffleState::Open,
            participants: Vec::new(),
            pooled_balance: 0,
            unclaimed_payout: 0,
            pending_request: None,
            request_nonce: 0,
            last_draw: DrawRecord {
                winner: None,
                timestamp: now,
            },
        })
    }

    pub fn upkeep_snapshot(&self, now: UnixTimestamp) -> UpkeepSnapshot {
        UpkeepSnapshot {
            now,
            last_draw_timestamp: self.last_draw.timestamp,
            interval: self.config.interval,
            state: self.state,
            balance: self.pooled_balance,
            participants: self.participant_count(),
        }
    }

    pub fn check_upkeep(&self, now: UnixTimestamp) -> bool {
        upkeep_needed(&self.upkeep_snapshot(now))
    }

    /// Registers `participant` with an attached `stake`.
    ///
    /// Every precondition is checked before the registry is touched.
    pub fn enter(&mut self, participant: Pubkey, stake: u64) -> Result<(), RaffleError> {
        if stake < self.config.entrance_fee {
            msg!(
                "Stake {} is below the entrance fee {}",
                stake,
                self.config.entrance_fee
            );
            return Err(RaffleError::InsufficientStake);
        }
        if self.state != RaffleState::Open {
            return Err(RaffleError::NotOpen);
        }
        if self.participant_count() >= self.config.max_participants {
            return Err(RaffleError::RegistryFull);
        }
        let pooled_balance = self
            .pooled_balance
            .checked_add(stake)
            .ok_or(RaffleError::ArithmeticOverflow)?;

        self.participants.push(participant);
        self.pooled_balance = pooled_balance;

        RaffleEvent::ParticipantEntered {
            participant,
            stake,
            participants: self.participant_count(),
        }
        .emit();
        Ok(())
    }

    /// Starts a draw if the trigger conditions hold. Anyone may call this.
    ///
    /// Returns the handle of the submitted randomness request. A failed
    /// request leaves the raffle open and untouched.
    pub fn perform_upkeep<O>(
        &mut self,
        now: UnixTimestamp,
        oracle: &mut O,
    ) -> Result<u64, RaffleError>
    where
        O: RandomnessOracle + ?Sized,
    {
        let snapshot = self.upkeep_snapshot(now);
        if !upkeep_needed(&snapshot) {
            return Err(RaffleError::UpkeepNotNeeded {
                balance: snapshot.balance,
                participants: snapshot.participants,
                state: snapshot.state,
            });
        }

        self.state = RaffleState::Drawing;
        let request_id = match oracle.request(self.request_nonce) {
            Ok(request_id) => request_id,
            Err(_) => {
                self.state = RaffleState::Open;
                return Err(RaffleError::OracleRequestFailed);
            }
        };
        self.pending_request = Some(request_id);
        self.request_nonce = self.request_nonce.wrapping_add(1);

        RaffleEvent::DrawRequested { request_id }.emit();
        Ok(request_id)
    }

    /// Resolves the entry a fulfillment would pick without changing anything.
    ///
    /// Fails with `UnknownRequest` unless `request_id` is the outstanding
    /// request, and with `EmptyRegistry` if nobody is registered.
    pub fn drawn_winner(
        &self,
        request_id: u64,
        random_value: u64,
    ) -> Result<(usize, Pubkey), RaffleError> {
        if self.state != RaffleState::Drawing || self.pending_request != Some(request_id) {
            msg!(
                "Fulfillment for request {} does not match pending {:?}",
                request_id,
                self.pending_request
            );
            return Err(RaffleError::UnknownRequest);
        }
        let index =
            winner_index(random_value, self.participants.len()).ok_or(RaffleError::EmptyRegistry)?;
        Ok((index, self.participants[index]))
    }

    /// Completes the outstanding draw with the oracle's random value.
    ///
    /// The registry is cleared and the raffle reopened before the payout is
    /// attempted. A failed payout does not restore the draw: the amount is
    /// kept as `unclaimed_payout` and `PayoutTransferFailed` is returned.
    pub fn fulfill_randomness<P>(
        &mut self,
        request_id: u64,
        random_value: u64,
        now: UnixTimestamp,
        payout: &mut P,
    ) -> Result<Pubkey, RaffleError>
    where
        P: PayoutExecutor + ?Sized,
    {
        let (index, winner) = self.drawn_winner(request_id, random_value)?;
        let amount = self.pooled_balance;
        let unclaimed_payout = self
            .unclaimed_payout
            .checked_add(amount)
            .ok_or(RaffleError::ArithmeticOverflow)?;

        self.last_draw = DrawRecord {
            winner: Some(winner),
            timestamp: now,
        };
        self.participants.clear();
        self.pooled_balance = 0;
        self.pending_request = None;
        self.state = RaffleState::Open;

        RaffleEvent::WinnerPicked {
            request_id,
            winner,
            index: index as u32,
            amount,
        }
        .emit();

        if payout.settle(amount, &winner).is_err() {
            msg!("Payout of {} lamports to {} failed", amount, winner);
            self.unclaimed_payout = unclaimed_payout;
            RaffleEvent::PayoutUnclaimed { winner, amount }.emit();
            return Err(RaffleError::PayoutTransferFailed);
        }

        RaffleEvent::PayoutSettled { winner, amount }.emit();
        Ok(winner)
    }
}
