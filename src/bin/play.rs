use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use game2048::engine::Seed;
use game2048::persist::{append_score, save_session, take_save};
use game2048::session::{wall_clock_seed, Command, Session, SessionConfig};
use log::warn;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug)]
#[command(author, version, about = "Play 2048 in the console, one line of keys at a time")]
struct Args {
    /// Undo rerolls the undone spawn instead of replaying it
    #[arg(long)]
    seed_hacking: bool,

    /// Resume the game stored in the save file (it is consumed)
    #[arg(long)]
    load: bool,

    /// Where "save and quit" writes the game
    #[arg(long, value_name = "PATH", default_value = "2048.sav")]
    save_file: PathBuf,

    /// Score log, one line per finished game
    #[arg(long, value_name = "PATH", default_value = "2048.scores")]
    score_file: PathBuf,

    /// Initial seed (defaults to the clock)
    #[arg(long, value_name = "N")]
    seed: Option<i64>,
}

fn start_session(args: &Args, config: SessionConfig) -> Session {
    if args.load {
        match take_save(&args.save_file) {
            Ok(Some(saved)) => return Session::resume(config, saved),
            Ok(None) => warn!("no saved game in {}, starting fresh", args.save_file.display()),
            Err(e) => warn!("discarding save file {}: {}", args.save_file.display(), e),
        }
    }
    let seed = args.seed.map(Seed).unwrap_or_else(wall_clock_seed);
    Session::new(config, seed)
}

fn log_score(path: &Path, score: u32) -> Result<()> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    append_score(path, timestamp, score)
        .with_context(|| format!("Failed to append to score log {}", path.display()))
}

/// Prints `question` and returns the first character of the answer, `None` on EOF.
fn ask<I>(lines: &mut I, question: &str) -> Result<Option<char>>
where
    I: Iterator<Item = io::Result<String>>,
{
    print!("{} ", question);
    io::stdout().flush()?;
    match lines.next() {
        Some(line) => Ok(line?.trim().chars().next()),
        None => Ok(None),
    }
}

fn draw(session: &Session) {
    println!();
    println!("2048 {:>23} pts", session.score());
    println!();
    println!("{}", session.board());
    println!();
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let config = SessionConfig {
        seed_hacking: args.seed_hacking,
    };
    let mut session = start_session(&args, config);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    'game: loop {
        draw(&session);

        if session.is_terminal() {
            println!("         GAME OVER          ");
            let answer = ask(&mut lines, "Undo last move? (u = undo, anything else = accept):")?;
            if answer == Some('u') {
                session.apply(Command::Undo);
                continue;
            }
            if let Some(final_score) = session.apply(Command::Quit).final_score {
                log_score(&args.score_file, final_score)?;
                println!("Final score: {}", final_score);
            }
            break;
        }

        print!("Keys (wasd/hjkl, u undo, r restart, q quit): ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            // end of input quits the game
            if let Some(final_score) = session.apply(Command::Quit).final_score {
                log_score(&args.score_file, final_score)?;
            }
            break;
        };
        let line = line?;

        for key in line.chars().filter(|c| !c.is_whitespace()) {
            match key {
                'q' => match ask(&mut lines, "QUIT? (y = quit, s = save and quit, n = cancel):")? {
                    Some('y') => {
                        if let Some(final_score) = session.apply(Command::Quit).final_score {
                            log_score(&args.score_file, final_score)?;
                        }
                        break 'game;
                    }
                    Some('s') => {
                        save_session(&args.save_file, &session.saved()).with_context(|| {
                            format!("Failed to write save file {}", args.save_file.display())
                        })?;
                        println!("Game saved to {}", args.save_file.display());
                        break 'game;
                    }
                    _ => break,
                },
                'r' => {
                    if ask(&mut lines, "RESTART? (y/n):")? == Some('y') {
                        if let Some(final_score) = session.apply(Command::Restart).final_score {
                            log_score(&args.score_file, final_score)?;
                        }
                    }
                    break;
                }
                _ => {
                    if session.apply_key(key).terminal {
                        break;
                    }
                }
            }
        }
    }
    Ok(())
}
