use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::AccountInfo,
    clock::UnixTimestamp,
    msg,
    program_error::ProgramError,
    program_pack::IsInitialized,
    pubkey::Pubkey,
};

use crate::error::RaffleError;

/// Lifecycle state of a raffle
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaffleState {
    /// Accepting entries and draw requests
    Open,
    /// A randomness request is in flight
    Drawing,
}

/// Per-raffle settings supplied at initialization
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RaffleConfig {
    /// Minimum stake per entry in lamports
    pub entrance_fee: u64,
    /// Seconds that must pass between draws
    pub interval: UnixTimestamp,
    /// Capacity of the participant registry
    pub max_participants: u32,
    /// Program that receives randomness requests
    pub oracle_program: Pubkey,
    /// Key that signs randomness fulfillments
    pub oracle_authority: Pubkey,
}

impl RaffleConfig {
    pub const LEN: usize = 8 + 8 + 4 + 32 + 32;

    pub fn validate(&self) -> Result<(), RaffleError> {
        if self.entrance_fee == 0 || self.max_participants == 0 || self.interval < 0 {
            return Err(RaffleError::InvalidConfig);
        }
        Ok(())
    }
}

/// Outcome of the last completed draw
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawRecord {
    /// Winner of the last draw (none before the first one)
    pub winner: Option<Pubkey>,
    /// Completion time of the last draw, or the initialization time
    pub timestamp: UnixTimestamp,
}

impl DrawRecord {
    pub const LEN: usize = 1 + 32 + 8;
}

/// Raffle account data
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Raffle {
    /// Is the account initialized
    pub is_initialized: bool,
    pub config: RaffleConfig,
    pub state: RaffleState,
    /// Entries for the current cycle in insertion order, duplicates allowed
    pub participants: Vec<Pubkey>,
    /// Lamports staked since the last completed draw
    pub pooled_balance: u64,
    /// Lamports of failed payouts still held by the raffle account
    pub unclaimed_payout: u64,
    /// Handle of the outstanding randomness request, set only while drawing
    pub pending_request: Option<u64>,
    /// Seed for the next request handle
    pub request_nonce: u64,
    pub last_draw: DrawRecord,
}

impl IsInitialized for Raffle {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Raffle {
    /// Serialized size with an empty registry.
    pub const BASE_LEN: usize = 1 + RaffleConfig::LEN + 1 + 4 + 8 + 8 + (1 + 8) + 8 + DrawRecord::LEN;

    /// Account size needed to hold `max_participants` entries.
    pub fn space(max_participants: u32) -> usize {
        Self::BASE_LEN + 32 * max_participants as usize
    }

    /// Deserializes the account without checking initialization.
    pub fn unpack_unchecked(data: &[u8]) -> Result<Self, ProgramError> {
        if data.len() < Self::BASE_LEN {
            msg!("Raffle account data too small: {} bytes", data.len());
            return Err(ProgramError::AccountDataTooSmall);
        }
        Self::deserialize(&mut &data[..]).map_err(|_| ProgramError::InvalidAccountData)
    }

    /// Loads an initialized raffle owned by `program_id`.
    pub fn load(account: &AccountInfo, program_id: &Pubkey) -> Result<Self, ProgramError> {
        if account.owner != program_id {
            msg!("Raffle account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }
        let raffle = Self::unpack_unchecked(&account.try_borrow_data()?)?;
        if !raffle.is_initialized() {
            return Err(RaffleError::NotInitialized.into());
        }
        Ok(raffle)
    }

    pub fn save(&self, account: &AccountInfo) -> Result<(), ProgramError> {
        let mut data = account.try_borrow_mut_data()?;
        let len = data.len();
        self.serialize(&mut &mut data[..]).map_err(|_| {
            msg!("Raffle does not fit in account of {} bytes", len);
            ProgramError::AccountDataTooSmall
        })
    }

    pub fn state(&self) -> RaffleState {
        self.state
    }

    pub fn pooled_balance(&self) -> u64 {
        self.pooled_balance
    }

    pub fn unclaimed_payout(&self) -> u64 {
        self.unclaimed_payout
    }

    pub fn participant_count(&self) -> u32 {
        self.participants.len() as u32
    }

    pub fn participant(&self, index: usize) -> Option<&Pubkey> {
        self.participants.get(index)
    }

    pub fn last_winner(&self) -> Option<Pubkey> {
        self.last_draw.winner
    }

    pub fn last_draw_timestamp(&self) -> UnixTimestamp {
        self.last_draw.timestamp
    }

    pub fn entrance_fee(&self) -> u64 {
        self.config.entrance_fee
    }

    pub fn interval(&self) -> UnixTimestamp {
        self.config.interval
    }

    pub fn pending_request(&self) -> Option<u64> {
        self.pending_request
    }
}
