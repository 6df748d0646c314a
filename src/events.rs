use borsh::BorshSerialize;
use solana_program::{log::sol_log_data, msg, pubkey::Pubkey};
use std::fmt;

/// Notifications emitted over the draw lifecycle
#[derive(BorshSerialize, Clone, Debug, PartialEq, Eq)]
pub enum RaffleEvent {
    ParticipantEntered {
        participant: Pubkey,
        stake: u64,
        participants: u32,
    },
    DrawRequested {
        request_id: u64,
    },
    WinnerPicked {
        request_id: u64,
        winner: Pubkey,
        index: u32,
        amount: u64,
    },
    PayoutSettled {
        winner: Pubkey,
        amount: u64,
    },
    PayoutUnclaimed {
        winner: Pubkey,
        amount: u64,
    },
}

impl RaffleEvent {
    /// Logs the event as text and as borsh-encoded program data.
    pub fn emit(&self) {
        msg!("{}", self);
        // Serializing into a Vec cannot fail
        sol_log_data(&[&self.try_to_vec().unwrap_or_default()]);
    }
}

impl fmt::Display for RaffleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaffleEvent::ParticipantEntered {
                participant,
                stake,
                participants,
            } => write!(
                f,
                "ParticipantEntered: {} staked {} lamports ({} entries)",
                participant, stake, participants
            ),
            RaffleEvent::DrawRequested { request_id } => {
                write!(f, "DrawRequested: request {}", request_id)
            }
            RaffleEvent::WinnerPicked {
                request_id,
                winner,
                index,
                amount,
            } => write!(
                f,
                "WinnerPicked: request {} entry #{} {} wins {} lamports",
                request_id, index, winner, amount
            ),
            RaffleEvent::PayoutSettled { winner, amount } => {
                write!(f, "PayoutSettled: {} lamports to {}", amount, winner)
            }
            RaffleEvent::PayoutUnclaimed { winner, amount } => {
                write!(f, "PayoutUnclaimed: {} lamports held for {}", amount, winner)
            }
        }
    }
}
