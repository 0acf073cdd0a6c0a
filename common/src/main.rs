use clap::Parser;
use minesweeper_ai::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::thread;
use std::time::Duration;

/// Watch the inference AI play a game of Minesweeper
#[derive(Parser)]
#[command(name = "minesweeper-ai")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of rows
    #[arg(long, default_value_t = GameConfig::default().height)]
    height: usize,
    /// Number of columns
    #[arg(long, default_value_t = GameConfig::default().width)]
    width: usize,
    /// Number of mines
    #[arg(long, default_value_t = GameConfig::default().mines)]
    mines: usize,
    /// Seed for mine placement and guesses; random if omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Pause between moves, in milliseconds
    #[arg(long, default_value_t = 250)]
    delay_ms: u64,
    /// Check the knowledge base for contradictions after every move
    #[arg(long)]
    audit: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // --- 1. Initialization ---
    let config = GameConfig {
        height: cli.height,
        width: cli.width,
        mines: cli.mines,
    };
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let mut game = Game::new(config, &mut rng)?;

    println!("--- Minesweeper Inference AI ---");
    println!("Strategy: Play cells known to be safe, guess randomly otherwise.");
    println!("Mines:");
    print!("{}", game.board());

    // --- 2. Game Loop ---
    let mut move_count = 0;
    while game.state() == GameState::Playing {
        move_count += 1;
        println!("\n--- Move #{} ---", move_count);

        match game.step(&mut rng)? {
            Some(Move::Safe(cell)) => println!("AI making safe move {}", cell),
            Some(Move::Guess(cell)) => println!("No known safe moves, AI making random move {}", cell),
            None => {
                println!("No moves left to make.");
                break;
            }
        }
        print!("{}", game);

        if cli.audit {
            audit::check_consistency(game.ai())?;
            println!("Knowledge: {} sentences, consistent.", game.ai().sentences().len());
        }

        thread::sleep(Duration::from_millis(cli.delay_ms));
    }

    // --- 3. Final Result ---
    println!("\n--- Game Over ---");
    println!(
        "Flagged {} of {} mines.",
        game.flags().len(),
        game.board().mines().len()
    );

    match game.state() {
        GameState::Won => println!("Result: The AI won!"),
        GameState::Lost => println!("Result: The AI hit a mine and lost."),
        GameState::Playing => println!("Result: The AI ran out of moves."),
    }
    Ok(())
}
