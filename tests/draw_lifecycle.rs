use solana_program::pubkey::Pubkey;

use vrf_raffle::{
    error::RaffleError,
    payout::PayoutExecutor,
    state::{Raffle, RaffleConfig, RaffleState},
    vrf::RandomnessOracle,
};

const FEE: u64 = 100;
const INTERVAL: i64 = 60;
const START: i64 = 1_000;

// Oracle double that hands out handles offset from the nonce
#[derive(Default)]
struct ScriptedOracle {
    requests: Vec<u64>,
    exhausted: bool,
}

impl RandomnessOracle for ScriptedOracle {
    fn request(&mut self, nonce: u64) -> Result<u64, RaffleError> {
        if self.exhausted {
            return Err(RaffleError::OracleRequestFailed);
        }
        self.requests.push(nonce);
        Ok(nonce + 1_000)
    }
}

#[derive(Default)]
struct Ledger {
    transfers: Vec<(Pubkey, u64)>,
    reject: bool,
}

impl PayoutExecutor for Ledger {
    fn settle(&mut self, amount: u64, recipient: &Pubkey) -> Result<(), RaffleError> {
        if self.reject {
            return Err(RaffleError::PayoutTransferFailed);
        }
        self.transfers.push((*recipient, amount));
        Ok(())
    }
}

fn new_raffle(max_participants: u32) -> Raffle {
    Raffle::new(
        RaffleConfig {
            entrance_fee: FEE,
            interval: INTERVAL,
            max_participants,
            oracle_program: Pubkey::new_unique(),
            oracle_authority: Pubkey::new_unique(),
        },
        START,
    )
    .unwrap()
}

fn with_entrants(count: usize) -> (Raffle, Vec<Pubkey>) {
    let mut raffle = new_raffle(16);
    let players: Vec<Pubkey> = (0..count).map(|_| Pubkey::new_unique()).collect();
    for player in &players {
        raffle.enter(*player, FEE).unwrap();
    }
    (raffle, players)
}

#[test]
fn entries_accumulate_count_and_pool() {
    let (raffle, players) = with_entrants(5);
    assert_eq!(raffle.participant_count(), 5);
    assert_eq!(raffle.pooled_balance(), 5 * FEE);
    assert_eq!(raffle.participant(0), Some(&players[0]));
    assert_eq!(raffle.participant(4), Some(&players[4]));
    assert_eq!(raffle.participant(5), None);
}

#[test]
fn larger_stakes_are_pooled_exactly() {
    let mut raffle = new_raffle(4);
    let player = Pubkey::new_unique();
    raffle.enter(player, FEE).unwrap();
    raffle.enter(player, 250).unwrap();

    // duplicates are separate entries
    assert_eq!(raffle.participant_count(), 2);
    assert_eq!(raffle.pooled_balance(), 350);
}

#[test]
fn stake_below_fee_is_rejected() {
    let mut raffle = new_raffle(4);
    assert_eq!(
        raffle.enter(Pubkey::new_unique(), FEE - 1),
        Err(RaffleError::InsufficientStake)
    );
    assert_eq!(raffle.participant_count(), 0);
    assert_eq!(raffle.pooled_balance(), 0);
}

#[test]
fn full_registry_rejects_entry() {
    let mut raffle = new_raffle(2);
    raffle.enter(Pubkey::new_unique(), FEE).unwrap();
    raffle.enter(Pubkey::new_unique(), FEE).unwrap();
    assert_eq!(
        raffle.enter(Pubkey::new_unique(), FEE),
        Err(RaffleError::RegistryFull)
    );
    assert_eq!(raffle.pooled_balance(), 2 * FEE);
}

#[test]
fn empty_raffle_does_not_need_upkeep() {
    let mut raffle = new_raffle(4);
    let mut oracle = ScriptedOracle::default();

    assert_eq!(
        raffle.perform_upkeep(START + INTERVAL, &mut oracle),
        Err(RaffleError::UpkeepNotNeeded {
            balance: 0,
            participants: 0,
            state: RaffleState::Open,
        })
    );
    assert_eq!(raffle.state(), RaffleState::Open);
    assert!(oracle.requests.is_empty());
}

#[test]
fn upkeep_waits_for_interval() {
    let (mut raffle, _) = with_entrants(2);
    let mut oracle = ScriptedOracle::default();

    assert!(!raffle.check_upkeep(START + INTERVAL - 1));
    assert!(matches!(
        raffle.perform_upkeep(START + INTERVAL - 1, &mut oracle),
        Err(RaffleError::UpkeepNotNeeded { .. })
    ));
    assert!(raffle.check_upkeep(START + INTERVAL));
    assert_eq!(raffle.perform_upkeep(START + INTERVAL, &mut oracle), Ok(1_000));
    assert_eq!(raffle.state(), RaffleState::Drawing);
    assert_eq!(raffle.pending_request(), Some(1_000));
}

#[test]
fn drawing_blocks_entries_and_second_trigger() {
    let (mut raffle, _) = with_entrants(2);
    let mut oracle = ScriptedOracle::default();
    raffle.perform_upkeep(START + INTERVAL, &mut oracle).unwrap();

    assert_eq!(
        raffle.enter(Pubkey::new_unique(), FEE),
        Err(RaffleError::NotOpen)
    );
    assert_eq!(raffle.participant_count(), 2);
    assert_eq!(raffle.pooled_balance(), 2 * FEE);

    assert_eq!(
        raffle.perform_upkeep(START + 10 * INTERVAL, &mut oracle),
        Err(RaffleError::UpkeepNotNeeded {
            balance: 2 * FEE,
            participants: 2,
            state: RaffleState::Drawing,
        })
    );
    assert_eq!(oracle.requests, vec![0]);
}

#[test]
fn failed_oracle_request_leaves_raffle_open() {
    let (mut raffle, _) = with_entrants(2);
    let mut oracle = ScriptedOracle {
        exhausted: true,
        ..Default::default()
    };

    assert_eq!(
        raffle.perform_upkeep(START + INTERVAL, &mut oracle),
        Err(RaffleError::OracleRequestFailed)
    );
    assert_eq!(raffle.state(), RaffleState::Open);
    assert_eq!(raffle.pending_request(), None);
    assert_eq!(raffle.request_nonce, 0);

    // still enterable and triggerable once the oracle recovers
    raffle.enter(Pubkey::new_unique(), FEE).unwrap();
    oracle.exhausted = false;
    assert_eq!(raffle.perform_upkeep(START + INTERVAL, &mut oracle), Ok(1_000));
}

#[test]
fn mismatched_fulfillment_changes_nothing() {
    let (mut raffle, _) = with_entrants(3);
    let mut ledger = Ledger::default();

    // nothing pending yet
    assert_eq!(
        raffle.fulfill_randomness(1_000, 7, START + INTERVAL, &mut ledger),
        Err(RaffleError::UnknownRequest)
    );

    let mut oracle = ScriptedOracle::default();
    let request_id = raffle.perform_upkeep(START + INTERVAL, &mut oracle).unwrap();
    let before = raffle.clone();

    assert_eq!(
        raffle.fulfill_randomness(request_id + 1, 7, START + INTERVAL, &mut ledger),
        Err(RaffleError::UnknownRequest)
    );
    assert_eq!(raffle, before);
    assert!(ledger.transfers.is_empty());
}

#[test]
fn three_entrants_second_one_wins_with_seven() {
    let (mut raffle, players) = with_entrants(3);
    assert_eq!(raffle.pooled_balance(), 300);

    let mut oracle = ScriptedOracle::default();
    let request_id = raffle.perform_upkeep(START + INTERVAL, &mut oracle).unwrap();
    assert_eq!(raffle.state(), RaffleState::Drawing);

    let mut ledger = Ledger::default();
    let drawn_at = START + INTERVAL + 5;
    let winner = raffle
        .fulfill_randomness(request_id, 7, drawn_at, &mut ledger)
        .unwrap();

    assert_eq!(winner, players[1]);
    assert_eq!(ledger.transfers, vec![(players[1], 300)]);
    assert_eq!(raffle.state(), RaffleState::Open);
    assert_eq!(raffle.participant_count(), 0);
    assert_eq!(raffle.pooled_balance(), 0);
    assert_eq!(raffle.pending_request(), None);
    assert_eq!(raffle.last_winner(), Some(players[1]));
    assert_eq!(raffle.last_draw_timestamp(), drawn_at);

    // replaying the same callback is rejected
    assert_eq!(
        raffle.fulfill_randomness(request_id, 7, drawn_at, &mut ledger),
        Err(RaffleError::UnknownRequest)
    );
    assert_eq!(ledger.transfers.len(), 1);
}

#[test]
fn winner_index_is_value_mod_count() {
    // u64::MAX % 4 == 3
    for (random_value, expected) in [(0u64, 0usize), (4, 0), (5, 1), (u64::MAX, 3)] {
        let (mut raffle, players) = with_entrants(4);
        let mut oracle = ScriptedOracle::default();
        let request_id = raffle.perform_upkeep(START + INTERVAL, &mut oracle).unwrap();
        let winner = raffle
            .fulfill_randomness(request_id, random_value, START + INTERVAL, &mut Ledger::default())
            .unwrap();
        assert_eq!(winner, players[expected], "random value {}", random_value);
    }
}

#[test]
fn failed_payout_still_completes_the_draw() {
    let (mut raffle, players) = with_entrants(3);
    let mut oracle = ScriptedOracle::default();
    let request_id = raffle.perform_upkeep(START + INTERVAL, &mut oracle).unwrap();

    let mut ledger = Ledger {
        reject: true,
        ..Default::default()
    };
    assert_eq!(
        raffle.fulfill_randomness(request_id, 2, START + INTERVAL, &mut ledger),
        Err(RaffleError::PayoutTransferFailed)
    );
    assert_eq!(raffle.state(), RaffleState::Open);
    assert_eq!(raffle.participant_count(), 0);
    assert_eq!(raffle.pooled_balance(), 0);
    assert_eq!(raffle.last_winner(), Some(players[2]));
    assert_eq!(raffle.unclaimed_payout(), 3 * FEE);
    assert!(ledger.transfers.is_empty());

    // the next cycle still runs and a paid draw leaves the unclaimed amount alone
    raffle.enter(players[0], FEE).unwrap();
    let request_id = raffle.perform_upkeep(START + 2 * INTERVAL, &mut oracle).unwrap();
    ledger.reject = false;
    raffle
        .fulfill_randomness(request_id, 0, START + 2 * INTERVAL, &mut ledger)
        .unwrap();
    assert_eq!(ledger.transfers, vec![(players[0], FEE)]);
    assert_eq!(raffle.unclaimed_payout(), 3 * FEE);
}

#[test]
fn drawn_winner_previews_without_mutation() {
    let (mut raffle, players) = with_entrants(3);
    let mut oracle = ScriptedOracle::default();
    let request_id = raffle.perform_upkeep(START + INTERVAL, &mut oracle).unwrap();
    let before = raffle.clone();

    assert_eq!(raffle.drawn_winner(request_id, 7), Ok((1, players[1])));
    assert_eq!(
        raffle.drawn_winner(request_id + 1, 7),
        Err(RaffleError::UnknownRequest)
    );
    assert_eq!(raffle, before);
}

#[test]
fn next_cycle_restarts_interval_and_handles() {
    let (mut raffle, _) = with_entrants(1);
    let mut oracle = ScriptedOracle::default();
    let mut ledger = Ledger::default();

    let first = raffle.perform_upkeep(START + INTERVAL, &mut oracle).unwrap();
    raffle
        .fulfill_randomness(first, 0, START + INTERVAL, &mut ledger)
        .unwrap();

    raffle.enter(Pubkey::new_unique(), FEE).unwrap();
    assert!(!raffle.check_upkeep(START + INTERVAL + 1));

    let second = raffle
        .perform_upkeep(START + 2 * INTERVAL, &mut oracle)
        .unwrap();
    assert_ne!(first, second);
    assert_eq!(oracle.requests, vec![0, 1]);
}

#[test]
fn drawing_with_empty_registry_is_refused() {
    let mut raffle = new_raffle(4);
    raffle.state = RaffleState::Drawing;
    raffle.pending_request = Some(3);
    let before = raffle.clone();

    assert_eq!(
        raffle.fulfill_randomness(3, 7, START, &mut Ledger::default()),
        Err(RaffleError::EmptyRegistry)
    );
    assert_eq!(raffle, before);
}
