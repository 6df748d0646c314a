use solana_program::{account_info::AccountInfo, msg, pubkey::Pubkey, rent::Rent};

use crate::error::RaffleError;

/// Transfers the pooled balance to a drawn winner.
pub trait PayoutExecutor {
    fn settle(&mut self, amount: u64, recipient: &Pubkey) -> Result<(), RaffleError>;
}

/// Moves lamports directly out of the program-owned raffle account
pub struct LamportPayout<'a, 'b> {
    pub vault: &'a AccountInfo<'b>,
    pub winner: &'a AccountInfo<'b>,
    pub rent: Rent,
}

impl PayoutExecutor for LamportPayout<'_, '_> {
    fn settle(&mut self, amount: u64, recipient: &Pubkey) -> Result<(), RaffleError> {
        if self.winner.key != recipient {
            msg!(
                "Winner account {} does not match drawn winner {}",
                self.winner.key,
                recipient
            );
            return Err(RaffleError::PayoutTransferFailed);
        }
        if !self.winner.is_writable {
            msg!("Winner account must be writable");
            return Err(RaffleError::PayoutTransferFailed);
        }

        let vault_balance = self
            .vault
            .lamports()
            .checked_sub(amount)
            .ok_or(RaffleError::PayoutTransferFailed)?;
        let winner_balance = self
            .winner
            .lamports()
            .checked_add(amount)
            .ok_or(RaffleError::PayoutTransferFailed)?;

        // The runtime refuses to leave a credited account below rent exemption
        let minimum_balance = self.rent.minimum_balance(self.winner.data_len());
        if winner_balance < minimum_balance {
            msg!(
                "Winner would hold {} lamports, below the rent-exempt minimum {}",
                winner_balance,
                minimum_balance
            );
            return Err(RaffleError::PayoutTransferFailed);
        }

        // Both borrows are taken before either balance is written
        let mut vault_lamports = self
            .vault
            .try_borrow_mut_lamports()
            .map_err(|_| RaffleError::PayoutTransferFailed)?;
        let mut winner_lamports = self
            .winner
            .try_borrow_mut_lamports()
            .map_err(|_| RaffleError::PayoutTransferFailed)?;
        **vault_lamports = vault_balance;
        **winner_lamports = winner_balance;

        msg!("Transferred {} lamports to {}", amount, recipient);
        Ok(())
    }
}
