use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::{error::RaffleError, state::RaffleConfig};

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub enum RaffleInstruction {
    /// Initialize a raffle in a pre-created account
    ///
    /// Accounts expected:
    /// 0. `[signer]` The authority creating the raffle
    /// 1. `[writable]` The raffle account, owned by this program, rent exempt
    ///    and at least `Raffle::space(config.max_participants)` bytes
    InitializeRaffle {
        config: RaffleConfig,
    },

    /// Enter the current draw cycle, staking at least the entrance fee
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The participant paying the stake
    /// 1. `[writable]` The raffle account
    /// 2. `[]` The system program
    Enter {
        /// Stake in lamports
        stake: u64,
    },

    /// Start a draw by requesting randomness once the trigger conditions hold
    ///
    /// Accounts expected:
    /// 0. `[signer]` Any user (permissionless, gated only by the trigger)
    /// 1. `[writable]` The raffle account
    /// 2. `[]` The configured oracle program
    PerformUpkeep {},

    /// Oracle callback delivering the random value for a pending request
    ///
    /// Accounts expected:
    /// 0. `[signer]` The configured oracle authority
    /// 1. `[writable]` The raffle account
    /// 2. `[writable]` The drawn winner, receives the pooled balance
    FulfillRandomness {
        request_id: u64,
        /// VRF output, only the first 8 bytes select the winner
        result: [u8; 32],
    },
}

impl RaffleInstruction {
    /// Unpacks a byte buffer into a RaffleInstruction
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        Self::try_from_slice(input).map_err(|_| RaffleError::InvalidInstruction.into())
    }

    /// Packs a RaffleInstruction into a byte buffer
    pub fn pack(&self) -> Vec<u8> {
        // Serializing into a Vec cannot fail
        self.try_to_vec().unwrap_or_default()
    }
}

/// Create initialize_raffle instruction
pub fn initialize_raffle(
    program_id: &Pubkey,
    authority: &Pubkey,
    raffle_account: &Pubkey,
    config: RaffleConfig,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new(*raffle_account, false),
        ],
        data: RaffleInstruction::InitializeRaffle { config }.pack(),
    }
}

/// Create enter instruction
pub fn enter(
    program_id: &Pubkey,
    participant: &Pubkey,
    raffle_account: &Pubkey,
    stake: u64,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*participant, true),
            AccountMeta::new(*raffle_account, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: RaffleInstruction::Enter { stake }.pack(),
    }
}

/// Create perform_upkeep instruction
pub fn perform_upkeep(
    program_id: &Pubkey,
    caller: &Pubkey,
    raffle_account: &Pubkey,
    oracle_program: &Pubkey,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*caller, true),
            AccountMeta::new(*raffle_account, false),
            AccountMeta::new_readonly(*oracle_program, false),
        ],
        data: RaffleInstruction::PerformUpkeep {}.pack(),
    }
}

/// Create fulfill_randomness instruction
pub fn fulfill_randomness(
    program_id: &Pubkey,
    oracle_authority: &Pubkey,
    raffle_account: &Pubkey,
    winner: &Pubkey,
    request_id: u64,
    result: [u8; 32],
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*oracle_authority, true),
            AccountMeta::new(*raffle_account, false),
            AccountMeta::new(*winner, false),
        ],
        data: RaffleInstruction::FulfillRandomness { request_id, result }.pack(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tag_is_rejected() {
        assert_eq!(
            RaffleInstruction::unpack(&[9]),
            Err(ProgramError::Custom(RaffleError::InvalidInstruction.code()))
        );
        assert!(RaffleInstruction::unpack(&[]).is_err());
    }

    #[test]
    fn fulfill_layout_is_tag_id_result() {
        let mut result = [0u8; 32];
        result[0] = 7;
        let data = RaffleInstruction::FulfillRandomness {
            request_id: 2,
            result,
        }
        .pack();

        assert_eq!(data.len(), 1 + 8 + 32);
        assert_eq!(data[0], 3);
        assert_eq!(&data[1..9], &2u64.to_le_bytes());
        assert_eq!(data[9], 7);
    }

    #[test]
    fn enter_builder_marks_participant_signer() {
        let program_id = Pubkey::new_unique();
        let participant = Pubkey::new_unique();
        let raffle = Pubkey::new_unique();
        let ix = enter(&program_id, &participant, &raffle, 100);

        assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
        assert_eq!(ix.accounts[2].pubkey, system_program::id());
        assert_eq!(
            RaffleInstruction::unpack(&ix.data),
            Ok(RaffleInstruction::Enter { stake: 100 })
        );
    }
}
