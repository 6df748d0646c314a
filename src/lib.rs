// Verifiable raffle program
// Participants stake a fixed fee, and once the draw interval has passed anyone
// can trigger a draw that requests randomness from an external VRF oracle.
// The oracle's callback picks the winner, who receives the whole pool.

pub mod entrypoint;
pub mod error;
pub mod events;
pub mod instruction;
pub mod payout;
pub mod processor;
pub mod raffle;
pub mod state;
pub mod upkeep;
pub mod vrf;

use solana_program::{account_info::AccountInfo, entrypoint::ProgramResult, pubkey::Pubkey};

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    processor::Processor::process(program_id, accounts, instruction_data)
}
