use solana_program::program_error::ProgramError;
use thiserror::Error;

use crate::state::RaffleState;

/// Errors that may be returned by the raffle program
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RaffleError {
    /// Invalid instruction data passed
    #[error("Invalid instruction data")]
    InvalidInstruction,

    /// Raffle account already holds an initialized raffle
    #[error("Raffle already initialized")]
    AlreadyInitialized,

    /// Raffle account has not been initialized
    #[error("Raffle not initialized")]
    NotInitialized,

    /// Entrance fee and capacity must both be non-zero
    #[error("Invalid raffle configuration")]
    InvalidConfig,

    /// Stake attached to an entry is below the entrance fee
    #[error("Stake is below the entrance fee")]
    InsufficientStake,

    /// Entries are only accepted while the raffle is open
    #[error("Raffle is not open")]
    NotOpen,

    /// No room left in the registry account
    #[error("Participant registry is full")]
    RegistryFull,

    /// Pooled balance would overflow
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    /// Trigger preconditions do not hold
    #[error("Upkeep not needed: balance={balance}, participants={participants}, state={state:?}")]
    UpkeepNotNeeded {
        balance: u64,
        participants: u32,
        state: RaffleState,
    },

    /// The randomness request itself could not be submitted
    #[error("Oracle randomness request failed")]
    OracleRequestFailed,

    /// Fulfillment signed by someone other than the configured oracle authority
    #[error("Fulfillment not signed by the oracle authority")]
    UnauthorizedOracle,

    /// Fulfillment does not match the outstanding request
    #[error("Unknown randomness request")]
    UnknownRequest,

    /// Fulfillment arrived with nobody registered
    #[error("Participant registry is empty")]
    EmptyRegistry,

    /// Transfer of the pool to the winner failed
    #[error("Payout transfer to winner failed")]
    PayoutTransferFailed,

    /// Winner account passed with a fulfillment is not the drawn winner
    #[error("Winner account does not match the drawn winner")]
    WinnerAccountMismatch,
}

impl RaffleError {
    /// Stable custom error code reported through `ProgramError::Custom`.
    pub fn code(&self) -> u32 {
        match self {
            RaffleError::InvalidInstruction => 0,
            RaffleError::AlreadyInitialized => 1,
            RaffleError::NotInitialized => 2,
            RaffleError::InvalidConfig => 3,
            RaffleError::InsufficientStake => 4,
            RaffleError::NotOpen => 5,
            RaffleError::RegistryFull => 6,
            RaffleError::ArithmeticOverflow => 7,
            RaffleError::UpkeepNotNeeded { .. } => 8,
            RaffleError::OracleRequestFailed => 9,
            RaffleError::UnauthorizedOracle => 10,
            RaffleError::UnknownRequest => 11,
            RaffleError::EmptyRegistry => 12,
            RaffleError::PayoutTransferFailed => 13,
            RaffleError::WinnerAccountMismatch => 14,
        }
    }
}

impl From<RaffleError> for ProgramError {
    fn from(e: RaffleError) -> Self {
        ProgramError::Custom(e.code())
    }
}
