//! Self-play demo driver
//!
//! Plays the engine against itself for a bounded number of plies and
//! prints each move with its search statistics. Useful for eyeballing
//! playing strength and search speed without a front-end.

use anyhow::Context;
use clap::Parser;
use log::info;

use ninuki::engine::notation;
use ninuki::{is_game_over, winner, Engine, Position, Stone};

#[derive(Parser)]
#[command(name = "ninuki", about = "Ninuki engine self-play demo")]
struct Cli {
    /// Search depth cap
    #[arg(long, default_value_t = 4)]
    depth: i8,

    /// Transposition table size in MiB
    #[arg(long, default_value_t = 64)]
    tt_mib: usize,

    /// Maximum plies to play
    #[arg(long, default_value_t = 40)]
    plies: u32,

    /// Log specification (flexi_logger syntax)
    #[arg(long, default_value = "info")]
    log: String,

    /// Print the board after every move
    #[arg(long)]
    show_board: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _logger = flexi_logger::Logger::try_with_str(&cli.log)
        .context("bad log specification")?
        .start()
        .context("logger init failed")?;

    let mut engine = Engine::with_config(cli.tt_mib * 1024 * 1024, cli.depth);
    let mut pos = Position::new();

    info!("self-play: depth {} table {} MiB", cli.depth, cli.tt_mib);

    for ply in 1..=cli.plies {
        let side = pos.side_to_move;
        let Some(mv) = engine.apply_engine_move(&mut pos) else {
            println!("ply {ply}: no candidate moves, stopping");
            break;
        };

        let stats = engine.last_stats();
        println!(
            "ply {ply:3} {side:?}: {:<4} score {:>8} nodes {:>7} hits {:>6} ({:.0?})",
            notation(mv),
            stats.score,
            stats.nodes,
            stats.cache_hits,
            stats.elapsed,
        );
        if cli.show_board {
            println!("{pos}");
        }

        if is_game_over(&pos) {
            match winner(&pos) {
                Some(Stone::Black) => println!("Black wins after {ply} plies"),
                Some(Stone::White) => println!("White wins after {ply} plies"),
                _ => println!("game over after {ply} plies"),
            }
            break;
        }
    }

    if !is_game_over(&pos) {
        println!("ply budget exhausted, no winner yet");
    }
    println!(
        "captures: Black {} pairs, White {} pairs",
        pos.captures(Stone::Black),
        pos.captures(Stone::White)
    );

    Ok(())
}
