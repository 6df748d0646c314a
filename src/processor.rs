use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::invoke,
    program_error::ProgramError,
    program_pack::IsInitialized,
    pubkey::Pubkey,
    system_instruction,
    system_program,
    sysvar::{clock::Clock, rent::Rent, Sysvar},
};

use crate::{
    error::RaffleError,
    instruction::RaffleInstruction,
    payout::LamportPayout,
    state::{Raffle, RaffleConfig},
    vrf::{self, CpiOracle},
};

pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = RaffleInstruction::unpack(instruction_data)?;

        match instruction {
            RaffleInstruction::InitializeRaffle { config } => {
                msg!("Instruction: Initialize Raffle");
                Self::process_initialize_raffle(program_id, accounts, config)
            }
            RaffleInstruction::Enter { stake } => {
                msg!("Instruction: Enter");
                Self::process_enter(program_id, accounts, stake)
            }
            RaffleInstruction::PerformUpkeep {} => {
                msg!("Instruction: Perform Upkeep");
                Self::process_perform_upkeep(program_id, accounts)
            }
            RaffleInstruction::FulfillRandomness { request_id, result } => {
                msg!("Instruction: Fulfill Randomness");
                Self::process_fulfill_randomness(program_id, accounts, request_id, result)
            }
        }
    }

    fn process_initialize_raffle(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        config: RaffleConfig,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let authority_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;

        if !authority_info.is_signer {
            msg!("Authority must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        if raffle_info.owner != program_id {
            msg!("Raffle account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        config.validate().map_err(report)?;

        let required = Raffle::space(config.max_participants);
        if raffle_info.data_len() < required {
            msg!(
                "Raffle account needs {} bytes for {} participants, has {}",
                required,
                config.max_participants,
                raffle_info.data_len()
            );
            return Err(ProgramError::AccountDataTooSmall);
        }

        let existing = Raffle::unpack_unchecked(&raffle_info.try_borrow_data()?)?;
        if existing.is_initialized() {
            return Err(report(RaffleError::AlreadyInitialized));
        }

        let rent = Rent::get()?;
        if !rent.is_exempt(raffle_info.lamports(), raffle_info.data_len()) {
            msg!("Raffle account must be rent exempt");
            return Err(ProgramError::AccountNotRentExempt);
        }

        let now = Clock::get()?.unix_timestamp;
        let raffle = Raffle::new(config, now).map_err(report)?;
        raffle.save(raffle_info)?;

        msg!(
            "Raffle initialized: EntranceFee={}, Interval={}s, Capacity={}, Oracle={}",
            config.entrance_fee,
            config.interval,
            config.max_participants,
            config.oracle_program
        );
        Ok(())
    }

    fn process_enter(program_id: &Pubkey, accounts: &[AccountInfo], stake: u64) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let participant_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !participant_info.is_signer {
            msg!("Participant must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        if *system_program_info.key != system_program::id() {
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut raffle = Raffle::load(raffle_info, program_id)?;
        raffle.enter(*participant_info.key, stake).map_err(report)?;

        invoke(
            &system_instruction::transfer(participant_info.key, raffle_info.key, stake),
            &[
                participant_info.clone(),
                raffle_info.clone(),
                system_program_info.clone(),
            ],
        )?;

        raffle.save(raffle_info)?;
        msg!(
            "Entry recorded: Participants={}, Pool={} lamports",
            raffle.participant_count(),
            raffle.pooled_balance()
        );
        Ok(())
    }

    fn process_perform_upkeep(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let oracle_program_info = next_account_info(account_info_iter)?;

        // Anyone can trigger the draw; the upkeep predicate is the only gate
        if !caller_info.is_signer {
            msg!("Initiator must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let mut raffle = Raffle::load(raffle_info, program_id)?;
        let now = Clock::get()?.unix_timestamp;

        let mut oracle = CpiOracle {
            oracle_program: oracle_program_info,
            requester: raffle_info,
            expected_program: raffle.config.oracle_program,
        };
        let request_id = raffle.perform_upkeep(now, &mut oracle).map_err(report)?;

        raffle.save(raffle_info)?;
        msg!("Draw requested for raffle {}: request {}", raffle_info.key, request_id);
        Ok(())
    }

    fn process_fulfill_randomness(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        request_id: u64,
        result: [u8; 32],
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let oracle_authority_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let winner_info = next_account_info(account_info_iter)?;

        let mut raffle = Raffle::load(raffle_info, program_id)?;

        if !oracle_authority_info.is_signer
            || *oracle_authority_info.key != raffle.config.oracle_authority
        {
            return Err(report(RaffleError::UnauthorizedOracle));
        }

        let random_value = vrf::random_value(&result);
        let (_, drawn) = raffle
            .drawn_winner(request_id, random_value)
            .map_err(report)?;
        if *winner_info.key != drawn || !winner_info.is_writable {
            msg!("Expected writable winner account {}", drawn);
            return Err(report(RaffleError::WinnerAccountMismatch));
        }

        let now = Clock::get()?.unix_timestamp;
        let mut payout = LamportPayout {
            vault: raffle_info,
            winner: winner_info,
            rent: Rent::get()?,
        };
        match raffle.fulfill_randomness(request_id, random_value, now, &mut payout) {
            Ok(winner) => {
                raffle.save(raffle_info)?;
                msg!("Draw {} completed! Winner: {}", request_id, winner);
                Ok(())
            }
            // The draw is final; the pool stays in the raffle account as unclaimed
            Err(RaffleError::PayoutTransferFailed) => {
                raffle.save(raffle_info)?;
                msg!(
                    "Raffle error: {}; {} lamports unclaimed",
                    RaffleError::PayoutTransferFailed,
                    raffle.unclaimed_payout()
                );
                Ok(())
            }
            Err(err) => Err(report(err)),
        }
    }
}

fn report(err: RaffleError) -> ProgramError {
    msg!("Raffle error: {}", err);
    err.into()
}
