// Randomness oracle client: request submission and VRF result decoding
use arrayref::array_ref;
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::AccountInfo,
    instruction::{AccountMeta, Instruction},
    msg,
    program::invoke,
    pubkey::Pubkey,
};

use crate::error::RaffleError;

/// Submits randomness requests to an external oracle.
///
/// The oracle answers each accepted request at most once, later, with a
/// random value tied to the returned handle.
pub trait RandomnessOracle {
    /// Requests one random value, seeding the handle with `nonce`.
    fn request(&mut self, nonce: u64) -> Result<u64, RaffleError>;
}

/// Payload sent to the oracle program
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum OracleRequest {
    /// Ask for a random value to be delivered back to `requester`
    RequestRandomness { request_id: u64, requester: Pubkey },
}

/// Oracle client that requests randomness through a cross-program invocation
pub struct CpiOracle<'a, 'b> {
    pub oracle_program: &'a AccountInfo<'b>,
    pub requester: &'a AccountInfo<'b>,
    /// Oracle program recorded in the raffle configuration
    pub expected_program: Pubkey,
}

impl RandomnessOracle for CpiOracle<'_, '_> {
    fn request(&mut self, nonce: u64) -> Result<u64, RaffleError> {
        if *self.oracle_program.key != self.expected_program {
            msg!(
                "Oracle program {} does not match configured {}",
                self.oracle_program.key,
                self.expected_program
            );
            return Err(RaffleError::OracleRequestFailed);
        }

        let data = OracleRequest::RequestRandomness {
            request_id: nonce,
            requester: *self.requester.key,
        }
        .try_to_vec()
        .map_err(|_| RaffleError::OracleRequestFailed)?;

        let instruction = Instruction {
            program_id: *self.oracle_program.key,
            accounts: vec![AccountMeta::new_readonly(*self.requester.key, false)],
            data,
        };

        invoke(
            &instruction,
            &[self.requester.clone(), self.oracle_program.clone()],
        )
        .map_err(|err| {
            msg!("Oracle rejected randomness request: {}", err);
            RaffleError::OracleRequestFailed
        })?;

        msg!("VRF randomness request {} submitted", nonce);
        Ok(nonce)
    }
}

/// Reduces a 32-byte VRF result to a u64 from its first 8 little-endian bytes.
pub fn random_value(result: &[u8; 32]) -> u64 {
    u64::from_le_bytes(*array_ref![result, 0, 8])
}

/// Index of the winning entry, or `None` when nobody entered.
pub fn winner_index(random_value: u64, participants: usize) -> Option<usize> {
    if participants == 0 {
        return None;
    }
    Some((random_value % participants as u64) as usize)
}
