//! CLI blackjack table.
//!
//! Run with `RUST_LOG=bjtable=debug` to watch the table's structured logs.

use std::io::{self, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use bjtable::{
    Card, Game, GameStatus, Hand, MemoryGameStore, MemoryLedger, PlayerLedger, Suit, Table,
    TableOptions,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    println!("Blackjack table (type 'q' to quit)");

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let table = Table::new(
        TableOptions::default(),
        MemoryLedger::new(),
        MemoryGameStore::new(),
        seed,
    );
    let player_id = table.ledger().create_player("guest", 500).id;

    loop {
        let money = table.ledger().balance(player_id).unwrap_or(0);
        if money == 0 {
            println!("You are out of money. Game over.");
            break;
        }

        let Some(bet) = prompt_u64(&format!("Bet amount (1-{money}, 0 to quit): ")) else {
            break;
        };
        if bet == 0 {
            println!("Goodbye.");
            break;
        }

        let mut queue = match table.start_game(player_id, bet).await {
            Ok(game) => vec![game],
            Err(err) => {
                println!("Bet error: {err}");
                continue;
            }
        };

        while let Some(mut game) = queue.pop() {
            while game.status() == GameStatus::InProgress {
                print_table(&table, &game);
                println!("{}", format_actions(&game));

                let result = match prompt_line("Action: ").as_str() {
                    "h" | "hit" => table.hit(game.id()).await,
                    "s" | "stand" => table.stand(game.id()).await,
                    "p" | "split" => split(&table, &game, &mut queue).await,
                    "i" | "insurance" => table.insurance(game.id()).await,
                    "q" | "quit" => return,
                    _ => {
                        println!("Unknown action.");
                        continue;
                    }
                };

                match result {
                    Ok(updated) => game = updated,
                    Err(err) => println!("Action error: {err}"),
                }
            }

            print_table(&table, &game);
            println!("Result: {:?}", game.result());
        }

        if let Ok(player) = table.ledger().get_player(player_id).await {
            println!(
                "Balance {} | played {} | won {} ({:.0}%)",
                player.balance,
                player.games_played,
                player.games_won,
                player.win_rate() * 100.0
            );
        }
    }
}

/// Splits and queues the new hand to be played after the current one.
async fn split(
    table: &Table<MemoryLedger, MemoryGameStore>,
    game: &Game,
    queue: &mut Vec<Game>,
) -> Result<Game, bjtable::TableError> {
    let updated = table.split(game.id()).await?;
    let active = table.active_games(game.player_id()).await?;
    queue.extend(
        active
            .into_iter()
            .filter(|other| other.split_from() == Some(game.id())),
    );
    Ok(updated)
}

fn prompt_line(prompt: &str) -> String {
    print!("{prompt}");
    let _ = io::stdout().flush();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return String::new();
    }
    input.trim().to_lowercase()
}

fn prompt_u64(prompt: &str) -> Option<u64> {
    loop {
        let input = prompt_line(prompt);
        if input == "q" || input == "quit" {
            return None;
        }
        match input.parse::<u64>() {
            Ok(value) => return Some(value),
            Err(_) => println!("Please enter a number."),
        }
    }
}

fn print_table(table: &Table<MemoryLedger, MemoryGameStore>, game: &Game) {
    println!("\nShoe: {} cards remaining", table.shoe().remaining());

    let dealer = game.dealer_hand();
    let shown = if game.status() == GameStatus::InProgress {
        dealer.up_card().map_or(0, Card::value).to_string()
    } else {
        dealer.value().to_string()
    };
    println!("Dealer: {} (showing {shown})", format_hand(dealer));
    println!(
        "You:    {} (value {}) | bet {}{}",
        format_hand(game.player_hand()),
        game.player_hand().value(),
        game.bet(),
        game.insurance_bet()
            .map_or_else(String::new, |stake| format!(" | insured {stake}"))
    );
    println!();
}

fn format_actions(game: &Game) -> String {
    let parts = [
        format_action("hit", "h", true),
        format_action("stand", "s", true),
        format_action("split", "p", game.check_split().is_ok()),
        format_action("insurance", "i", game.is_insurance_offered()),
    ];
    format!("Actions: {}", parts.join(" "))
}

fn format_action(label: &str, key: &str, allowed: bool) -> String {
    let text = format!("[{key}]{label}");
    if allowed {
        colorize(&text, "32")
    } else {
        colorize(&text, "90")
    }
}

fn colorize(text: &str, code: &str) -> String {
    format!("\u{1b}[{code}m{text}\u{1b}[0m")
}

fn format_hand(hand: &Hand) -> String {
    if hand.is_empty() {
        return "(empty)".to_string();
    }
    hand.cards()
        .iter()
        .map(format_card)
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_card(card: &Card) -> String {
    if !card.face_up {
        return card.to_string();
    }
    let color_code = match card.suit {
        Suit::Hearts | Suit::Diamonds => "31",
        Suit::Clubs | Suit::Spades => "34",
    };
    colorize(&card.to_string(), color_code)
}
