//! Card, hand, shoe, and game state machine tests.

#![expect(clippy::float_cmp, reason = "options hold exact literals")]

use std::collections::HashMap;
use std::collections::HashSet;

use bjtable::{
    ActionError, Card, DECK_SIZE, Game, GameAction, GameResult, GameStatus, Hand,
    InsuranceRejection, Rank, RoundingMode, Shoe, ShoeError, SplitRejection, Suit, TableOptions,
    dealer_should_draw,
};

const fn card(suit: Suit, rank: Rank) -> Card {
    Card::new(suit, rank)
}

fn hand(ranks: &[Rank]) -> Hand {
    Hand::from_cards(ranks.iter().map(|&rank| card(Suit::Spades, rank)))
}

fn game_from(cards: [Card; 4], bet: u64) -> Game {
    Game::deal(1, bet, cards)
}

/// Best total by trying every ace as 1 or 11.
fn brute_force_value(ranks: &[Rank]) -> u8 {
    let aces = ranks.iter().filter(|&&rank| rank == Rank::Ace).count();
    let base: u32 = ranks.iter().map(|rank| u32::from(rank.value())).sum();
    (0..=aces)
        .map(|high| base + 10 * high as u32)
        .filter(|&total| total <= 21)
        .max()
        .unwrap_or(base) as u8
}

#[test]
fn hand_value_matches_best_ace_assignment() {
    for a in Rank::ALL {
        for b in Rank::ALL {
            for c in Rank::ALL {
                for ranks in [vec![a, b], vec![a, b, c], vec![a, b, c, Rank::Ace]] {
                    assert_eq!(
                        hand(&ranks).value(),
                        brute_force_value(&ranks),
                        "ranks {ranks:?}"
                    );
                }
            }
        }
    }
}

#[test]
fn soft_hard_blackjack_and_bust() {
    let soft_17 = hand(&[Rank::Ace, Rank::Six]);
    assert_eq!(soft_17.value(), 17);
    assert_eq!(soft_17.hard_value(), 7);
    assert!(soft_17.is_soft());

    let hard_17 = hand(&[Rank::Ace, Rank::Six, Rank::Queen]);
    assert_eq!(hard_17.value(), 17);
    assert!(!hard_17.is_soft());

    let aces = hand(&[Rank::Ace, Rank::Ace]);
    assert_eq!(aces.value(), 12);
    assert!(aces.is_soft());

    let natural = hand(&[Rank::Ace, Rank::King]);
    assert!(natural.is_blackjack());
    assert!(natural.is_soft());

    let three_card_21 = hand(&[Rank::Seven, Rank::Seven, Rank::Seven]);
    assert_eq!(three_card_21.value(), 21);
    assert!(!three_card_21.is_blackjack());

    let bust = hand(&[Rank::Ten, Rank::Eight, Rank::Five]);
    assert_eq!(bust.value(), 23);
    assert!(bust.is_busted());
    assert!(!bust.is_soft());
}

#[test]
fn split_pairs_on_value() {
    assert!(hand(&[Rank::Ten, Rank::King]).can_split());
    assert!(hand(&[Rank::Ace, Rank::Ace]).can_split());
    assert!(!hand(&[Rank::Eight, Rank::Nine]).can_split());
    assert!(!hand(&[Rank::Eight, Rank::Eight, Rank::Two]).can_split());
}

#[test]
fn card_identity_ignores_face_and_display_hides_hole() {
    let up = card(Suit::Hearts, Rank::Ace);
    let mut down = up;
    down.flip();

    assert_eq!(up, down);
    assert_eq!(up.to_string(), "A♥");
    assert_eq!(down.to_string(), "🂠");

    let shown = Hand::from_cards([up, card(Suit::Spades, Rank::King)]);
    assert_eq!(shown.to_string(), "A♥ K♠ (21)");
}

#[test]
fn shoe_deals_every_card_once_then_exhausts() {
    let shoe = Shoe::new(2, 20, 9);
    assert_eq!(shoe.remaining(), 2 * DECK_SIZE);

    let mut counts: HashMap<Card, usize> = HashMap::new();
    while let Ok(card) = shoe.draw() {
        *counts.entry(card).or_default() += 1;
    }

    assert_eq!(counts.len(), DECK_SIZE);
    assert!(counts.values().all(|&count| count == 2));
    assert_eq!(
        shoe.draw().unwrap_err(),
        ShoeError::DeckExhausted {
            requested: 1,
            remaining: 0
        }
    );
}

#[test]
fn draw_many_is_ordered_and_atomic() {
    let draws = [
        card(Suit::Hearts, Rank::Two),
        card(Suit::Clubs, Rank::Three),
        card(Suit::Spades, Rank::Four),
    ];
    let shoe = Shoe::stacked(&draws, 0, 1);

    assert_eq!(
        shoe.draw_many(4).unwrap_err(),
        ShoeError::DeckExhausted {
            requested: 4,
            remaining: 3
        }
    );
    assert_eq!(shoe.remaining(), 3);

    assert_eq!(shoe.draw_many(2).unwrap(), draws[..2].to_vec());
    assert_eq!(shoe.draw().unwrap(), draws[2]);
}

#[test]
fn restore_puts_cards_back_in_draw_order() {
    let draws = [
        card(Suit::Hearts, Rank::Two),
        card(Suit::Clubs, Rank::Three),
        card(Suit::Spades, Rank::Four),
    ];
    let shoe = Shoe::stacked(&draws, 0, 1);

    let mut taken = shoe.draw_many(2).unwrap();
    taken[1].flip();
    shoe.restore(&taken);

    let again = shoe.draw_many(3).unwrap();
    assert_eq!(again, draws.to_vec());
    assert!(again.iter().all(|card| card.face_up));
}

#[test]
fn reshuffle_threshold_and_initialize() {
    let shoe = Shoe::stacked(&[card(Suit::Hearts, Rank::Two); 10], 20, 3);
    assert!(shoe.needs_reshuffle());

    assert!(shoe.initialize_if_needed(1));
    assert_eq!(shoe.remaining(), DECK_SIZE);
    assert!(!shoe.needs_reshuffle());
    assert!(!shoe.initialize_if_needed(1));

    shoe.initialize(4);
    assert_eq!(shoe.remaining(), 4 * DECK_SIZE);
}

#[test]
fn only_refills_start_a_new_generation() {
    let shoe = Shoe::stacked(&[card(Suit::Hearts, Rank::Two); 10], 20, 3);
    assert_eq!(shoe.generation(), 0);

    shoe.shuffle();
    shoe.draw().unwrap();
    assert_eq!(shoe.generation(), 0);

    assert!(shoe.initialize_if_needed(1));
    assert_eq!(shoe.generation(), 1);
    assert!(!shoe.initialize_if_needed(1));
    assert_eq!(shoe.generation(), 1);

    shoe.initialize(2);
    assert_eq!(shoe.generation(), 2);
}

#[test]
fn shuffle_keeps_the_same_cards() {
    let shoe = Shoe::new(1, 0, 5);
    shoe.shuffle();
    let cards: HashSet<Card> = shoe.draw_many(DECK_SIZE).unwrap().into_iter().collect();
    assert_eq!(cards.len(), DECK_SIZE);
}

#[test]
fn concurrent_draws_never_repeat_a_card() {
    let shoe = Shoe::new(1, 0, 11);

    let drawn: Vec<Card> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| (0..13).map(|_| shoe.draw().unwrap()).collect::<Vec<_>>()))
            .collect();
        handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect()
    });

    let unique: HashSet<Card> = drawn.iter().copied().collect();
    assert_eq!(unique.len(), DECK_SIZE);
    assert_eq!(shoe.remaining(), 0);
}

#[test]
fn dealer_hits_soft_17_and_stands_on_hard_17() {
    assert!(dealer_should_draw(&hand(&[Rank::Ten, Rank::Six]), false));
    assert!(dealer_should_draw(&hand(&[Rank::Ace, Rank::Six]), false));
    assert!(!dealer_should_draw(&hand(&[Rank::Ace, Rank::Six]), true));
    assert!(!dealer_should_draw(&hand(&[Rank::Ten, Rank::Seven]), false));
    assert!(!dealer_should_draw(&hand(&[Rank::Ace, Rank::Seven]), false));
    assert!(!dealer_should_draw(&hand(&[Rank::Ten, Rank::Six, Rank::Nine]), false));
}

#[test]
fn dealer_play_stops_exactly_at_the_house_rule() {
    for stand_on_soft_17 in [false, true] {
        let options = TableOptions::default().with_stand_on_soft_17(stand_on_soft_17);
        for seed in 0..500 {
            let shoe = Shoe::new(6, 0, seed);
            let opening: [Card; 4] = shoe.draw_many(4).unwrap().try_into().unwrap();
            let mut game = game_from(opening, 10);
            game.stand(&mut &shoe, &options).unwrap();

            let dealer = game.dealer_hand();
            assert!(
                !dealer_should_draw(dealer, stand_on_soft_17),
                "seed {seed}: dealer stopped early at {dealer}"
            );
            assert!(dealer.is_busted() || dealer.value() >= 17);
            if !stand_on_soft_17 && dealer.value() == 17 {
                assert!(!dealer.is_soft(), "seed {seed}: stood on soft 17");
            }

            let cards = dealer.cards();
            if cards.len() > 2 {
                let before_last = Hand::from_cards(cards[..cards.len() - 1].iter().copied());
                assert!(
                    dealer_should_draw(&before_last, stand_on_soft_17),
                    "seed {seed}: dealer drew past {before_last}"
                );
            }
        }
    }
}

#[test]
fn deal_alternates_and_hides_hole_card() {
    let game = game_from(
        [
            card(Suit::Hearts, Rank::Two),
            card(Suit::Clubs, Rank::Three),
            card(Suit::Spades, Rank::Four),
            card(Suit::Diamonds, Rank::Five),
        ],
        10,
    );

    assert_eq!(game.status(), GameStatus::InProgress);
    assert_eq!(
        game.player_hand().cards(),
        &[card(Suit::Hearts, Rank::Two), card(Suit::Spades, Rank::Four)]
    );
    assert_eq!(
        game.dealer_hand().cards(),
        &[card(Suit::Clubs, Rank::Three), card(Suit::Diamonds, Rank::Five)]
    );
    assert!(game.dealer_hand().cards()[0].face_up);
    assert!(!game.dealer_hand().cards()[1].face_up);
    assert!(game.is_player_turn());
    assert!(game.actions().is_empty());
}

#[test]
fn player_blackjack_pays_three_to_two() {
    let options = TableOptions::default();
    let mut game = game_from(
        [
            card(Suit::Hearts, Rank::Ace),
            card(Suit::Diamonds, Rank::Nine),
            card(Suit::Spades, Rank::King),
            card(Suit::Clubs, Rank::Four),
        ],
        10,
    );
    let shoe = Shoe::stacked(&[card(Suit::Clubs, Rank::Five)], 0, 1);

    let settlement = game.stand(&mut &shoe, &options).unwrap();

    assert_eq!(settlement.result, GameResult::PlayerBlackjack);
    assert_eq!(settlement.credit, 25);
    assert_eq!(settlement.net(), 15);
    assert_eq!(game.dealer_hand().value(), 18);
    assert!(game.dealer_hand().cards().iter().all(|card| card.face_up));
    assert_eq!(game.status(), GameStatus::Completed);
    assert_eq!(game.result(), Some(GameResult::PlayerBlackjack));
    assert!(game.end_time().is_some());
}

#[test]
fn hit_to_bust_completes_without_dealer_play() {
    let options = TableOptions::default();
    let mut game = game_from(
        [
            card(Suit::Hearts, Rank::Ten),
            card(Suit::Clubs, Rank::Six),
            card(Suit::Spades, Rank::Eight),
            card(Suit::Clubs, Rank::Nine),
        ],
        10,
    );
    let shoe = Shoe::stacked(
        &[
            card(Suit::Diamonds, Rank::Five),
            card(Suit::Hearts, Rank::King),
        ],
        0,
        1,
    );

    let (drawn, settlement) = game.hit(&mut &shoe, &options).unwrap();
    let settlement = settlement.unwrap();

    assert_eq!(drawn, card(Suit::Diamonds, Rank::Five));
    assert_eq!(game.player_hand().value(), 23);
    assert_eq!(settlement.result, GameResult::DealerWin);
    assert_eq!(settlement.credit, 0);
    assert_eq!(settlement.net(), -10);
    assert_eq!(game.dealer_hand().len(), 2);
    assert_eq!(shoe.remaining(), 1);
    assert_eq!(game.actions(), &[GameAction::Hit]);

    assert_eq!(
        game.hit(&mut &shoe, &options).unwrap_err(),
        ActionError::GameNotInProgress
    );
    assert_eq!(
        game.stand(&mut &shoe, &options).unwrap_err(),
        ActionError::GameNotInProgress
    );
}

#[test]
fn push_returns_the_stake() {
    let mut game = game_from(
        [
            card(Suit::Hearts, Rank::Ten),
            card(Suit::Clubs, Rank::Ten),
            card(Suit::Spades, Rank::Seven),
            card(Suit::Diamonds, Rank::Seven),
        ],
        10,
    );
    let shoe = Shoe::stacked(&[], 0, 1);

    let settlement = game.stand(&mut &shoe, &TableOptions::default()).unwrap();

    assert_eq!(settlement.result, GameResult::Push);
    assert_eq!(settlement.credit, 10);
    assert_eq!(settlement.net(), 0);
    assert!(settlement.counts_as_win());
    assert_eq!(settlement.profit(), 0);
}

#[test]
fn zero_bet_loss_is_not_a_win() {
    let mut game = game_from(
        [
            card(Suit::Hearts, Rank::Ten),
            card(Suit::Clubs, Rank::Ten),
            card(Suit::Spades, Rank::Seven),
            card(Suit::Diamonds, Rank::Nine),
        ],
        0,
    );
    let shoe = Shoe::stacked(&[], 0, 1);

    let settlement = game.stand(&mut &shoe, &TableOptions::default()).unwrap();

    assert_eq!(settlement.result, GameResult::DealerWin);
    assert!(!settlement.counts_as_win());
    assert_eq!(settlement.net(), 0);
}

#[test]
fn huge_bets_settle_without_overflow() {
    let shoe = Shoe::stacked(&[], 0, 1);

    let mut natural = game_from(
        [
            card(Suit::Hearts, Rank::Ace),
            card(Suit::Clubs, Rank::Ten),
            card(Suit::Spades, Rank::King),
            card(Suit::Diamonds, Rank::Seven),
        ],
        u64::MAX,
    );
    let settlement = natural.stand(&mut &shoe, &TableOptions::default()).unwrap();
    assert_eq!(settlement.result, GameResult::PlayerBlackjack);
    assert_eq!(settlement.credit, u64::MAX);
    assert_eq!(settlement.net(), 0);

    let mut win = game_from(
        [
            card(Suit::Hearts, Rank::Ten),
            card(Suit::Clubs, Rank::Ten),
            card(Suit::Spades, Rank::Nine),
            card(Suit::Diamonds, Rank::Seven),
        ],
        u64::MAX / 2 + 1,
    );
    let settlement = win.stand(&mut &shoe, &TableOptions::default()).unwrap();
    assert_eq!(settlement.result, GameResult::PlayerWin);
    assert_eq!(settlement.credit, u64::MAX);
    assert_eq!(settlement.net(), i64::MAX);
}

#[test]
fn dealer_bust_pays_even_money() {
    let mut game = game_from(
        [
            card(Suit::Hearts, Rank::Ten),
            card(Suit::Clubs, Rank::Ten),
            card(Suit::Spades, Rank::Nine),
            card(Suit::Diamonds, Rank::Six),
        ],
        10,
    );
    let shoe = Shoe::stacked(&[card(Suit::Hearts, Rank::King)], 0, 1);

    let settlement = game.stand(&mut &shoe, &TableOptions::default()).unwrap();

    assert_eq!(settlement.result, GameResult::PlayerWin);
    assert_eq!(settlement.credit, 20);
    assert_eq!(settlement.dealer_value, 26);
}

#[test]
fn dealer_soft_17_rule_follows_options() {
    let deal = [
        card(Suit::Hearts, Rank::Ten),
        card(Suit::Clubs, Rank::Ace),
        card(Suit::Spades, Rank::Nine),
        card(Suit::Diamonds, Rank::Six),
    ];

    let mut hits = game_from(deal, 10);
    let shoe = Shoe::stacked(&[card(Suit::Spades, Rank::Four)], 0, 1);
    let settlement = hits.stand(&mut &shoe, &TableOptions::default()).unwrap();
    assert_eq!(settlement.dealer_value, 21);
    assert_eq!(settlement.result, GameResult::DealerWin);

    let mut stands = game_from(deal, 10);
    let shoe = Shoe::stacked(&[card(Suit::Spades, Rank::Four)], 0, 1);
    let options = TableOptions::default().with_stand_on_soft_17(true);
    let settlement = stands.stand(&mut &shoe, &options).unwrap();
    assert_eq!(settlement.dealer_value, 17);
    assert_eq!(settlement.result, GameResult::PlayerWin);
    assert_eq!(shoe.remaining(), 1);
}

#[test]
fn stand_with_empty_shoe_leaves_game_unchanged() {
    let mut game = game_from(
        [
            card(Suit::Hearts, Rank::Ten),
            card(Suit::Clubs, Rank::Five),
            card(Suit::Spades, Rank::Nine),
            card(Suit::Diamonds, Rank::Six),
        ],
        10,
    );
    let before = game.clone();
    let shoe = Shoe::stacked(&[], 0, 1);

    assert_eq!(
        game.stand(&mut &shoe, &TableOptions::default()).unwrap_err(),
        ActionError::Shoe(ShoeError::DeckExhausted {
            requested: 1,
            remaining: 0
        })
    );
    assert_eq!(game, before);
}

#[test]
fn split_moves_second_card_to_a_new_game() {
    let mut game = game_from(
        [
            card(Suit::Hearts, Rank::Ten),
            card(Suit::Clubs, Rank::Five),
            card(Suit::Spades, Rank::King),
            card(Suit::Diamonds, Rank::Nine),
        ],
        10,
    );
    let shoe = Shoe::stacked(
        &[
            card(Suit::Hearts, Rank::Two),
            card(Suit::Clubs, Rank::Three),
        ],
        0,
        1,
    );

    let split = game.split(&mut &shoe).unwrap();

    assert_eq!(
        game.player_hand().cards(),
        &[card(Suit::Hearts, Rank::Ten), card(Suit::Hearts, Rank::Two)]
    );
    assert_eq!(
        split.player_hand().cards(),
        &[card(Suit::Spades, Rank::King), card(Suit::Clubs, Rank::Three)]
    );
    assert_eq!(split.dealer_hand(), game.dealer_hand());
    assert_eq!(split.bet(), 10);
    assert_eq!(split.split_from(), Some(game.id()));
    assert_ne!(split.id(), game.id());
    assert_eq!(split.status(), GameStatus::InProgress);
    assert_eq!(game.actions(), &[GameAction::Split]);
}

#[test]
fn split_rejects_unequal_values() {
    let mut game = game_from(
        [
            card(Suit::Hearts, Rank::Eight),
            card(Suit::Clubs, Rank::Five),
            card(Suit::Spades, Rank::Nine),
            card(Suit::Diamonds, Rank::Nine),
        ],
        10,
    );
    let before = game.clone();
    let shoe = Shoe::new(1, 0, 1);

    assert_eq!(
        game.split(&mut &shoe).unwrap_err(),
        ActionError::InvalidSplit(SplitRejection::UnequalValues(8, 9))
    );
    assert_eq!(game, before);
    assert_eq!(shoe.remaining(), DECK_SIZE);
}

#[test]
fn insurance_needs_a_dealer_ace_and_is_taken_once() {
    let mut game = game_from(
        [
            card(Suit::Hearts, Rank::Nine),
            card(Suit::Spades, Rank::Ace),
            card(Suit::Diamonds, Rank::Seven),
            card(Suit::Clubs, Rank::King),
        ],
        10,
    );
    assert!(game.is_insurance_offered());

    game.take_insurance(5).unwrap();
    assert_eq!(game.insurance_bet(), Some(5));
    assert_eq!(
        game.take_insurance(5).unwrap_err(),
        ActionError::InvalidInsurance(InsuranceRejection::AlreadyTaken)
    );

    let shoe = Shoe::stacked(&[], 0, 1);
    let settlement = game.stand(&mut &shoe, &TableOptions::default()).unwrap();
    assert_eq!(settlement.result, GameResult::DealerWin);
    assert_eq!(settlement.insurance_credit, 10);
    assert_eq!(settlement.insurance_won(), Some(true));
    assert_eq!(settlement.net(), -5);

    let mut no_ace = game_from(
        [
            card(Suit::Hearts, Rank::Nine),
            card(Suit::Spades, Rank::King),
            card(Suit::Diamonds, Rank::Seven),
            card(Suit::Clubs, Rank::Ace),
        ],
        10,
    );
    assert_eq!(
        no_ace.take_insurance(5).unwrap_err(),
        ActionError::InvalidInsurance(InsuranceRejection::NoDealerAce)
    );
}

#[test]
fn insurance_is_lost_without_dealer_blackjack() {
    let mut game = game_from(
        [
            card(Suit::Hearts, Rank::Ten),
            card(Suit::Spades, Rank::Ace),
            card(Suit::Diamonds, Rank::Nine),
            card(Suit::Clubs, Rank::Seven),
        ],
        10,
    );
    game.take_insurance(5).unwrap();

    let shoe = Shoe::stacked(&[], 0, 1);
    let settlement = game.stand(&mut &shoe, &TableOptions::default()).unwrap();

    assert_eq!(settlement.dealer_value, 18);
    assert_eq!(settlement.result, GameResult::PlayerWin);
    assert_eq!(settlement.insurance_credit, 0);
    assert_eq!(settlement.insurance_won(), Some(false));
    assert_eq!(settlement.net(), 5);
}

#[test]
fn options_builder_sets_fields() {
    let options = TableOptions::default()
        .with_decks(4)
        .with_reshuffle_threshold(52)
        .with_stand_on_soft_17(true)
        .with_blackjack_pays(1.2)
        .with_insurance_pays(3.0)
        .with_rounding_blackjack(RoundingMode::Up)
        .with_rounding_insurance(RoundingMode::Down)
        .with_storage_retries(5);

    assert_eq!(options.decks, 4);
    assert_eq!(options.reshuffle_threshold, 52);
    assert!(options.stand_on_soft_17);
    assert_eq!(options.blackjack_pays, 1.2);
    assert_eq!(options.insurance_pays, 3.0);
    assert_eq!(options.rounding_blackjack, RoundingMode::Up);
    assert_eq!(options.rounding_insurance, RoundingMode::Down);
    assert_eq!(options.storage_retries, 5);
}

#[test]
fn insurance_stake_rounds_odd_bets() {
    let options = TableOptions::default();
    assert_eq!(options.insurance_stake(10), 5);
    assert_eq!(options.insurance_stake(15), 8);

    let options = options.with_rounding_insurance(RoundingMode::Down);
    assert_eq!(options.insurance_stake(15), 7);
}

#[test]
fn options_deserialize_with_defaults() {
    let options: TableOptions =
        serde_json::from_str(r#"{ "decks": 2, "rounding_blackjack": "nearest" }"#).unwrap();

    assert_eq!(options.decks, 2);
    assert_eq!(options.rounding_blackjack, RoundingMode::Nearest);
    assert_eq!(options.reshuffle_threshold, 20);
    assert!(!options.stand_on_soft_17);
}
