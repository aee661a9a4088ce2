mod console;

use crate::console::{ConsolePlayer, SpeechFeed};
use sangkamp_core::{
    ContentProvider, Difficulty, GameSettings, SangkampConfig, SessionController, SessionEvent,
    ThemeStore, VoiceListener, POINTS_PER_CORRECT,
};
use sangkamp_gemini::GeminiProvider;
use std::io::BufRead;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_TARGET: &str = "sangkamp::app";

#[tokio::main]
async fn main() {
    // Load config or create template on first run
    let config = match SangkampConfig::load_or_create() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    init_tracing(config.logging.enabled);

    let provider: Arc<dyn ContentProvider> = match GeminiProvider::new(config.gemini.clone()) {
        Ok(provider) => Arc::new(provider),
        Err(e) => {
            eprintln!("Failed to initialize content provider: {e}");
            std::process::exit(1);
        }
    };
    info!(target: LOG_TARGET, "Initialized content provider: {}", provider.name());

    let speech = Arc::new(SpeechFeed::new());
    let player = Arc::new(ConsolePlayer::default());

    let controller = SessionController::new(
        provider.clone(),
        player,
        config.game.clone(),
        config.voice.keywords.clone(),
        None,
    );

    let listener = VoiceListener::new(controller.clone(), speech.clone());
    let listener_handle = listener.start();

    tokio::spawn(log_session_events(controller.clone()));

    // Ctrl+C cancels the session token, which tears down timers and listener
    let ctrlc_token = controller.cancel_token();
    if let Err(e) = ctrlc::set_handler(move || ctrlc_token.cancel()) {
        warn!(target: LOG_TARGET, "Could not install Ctrl+C handler: {}", e);
    }

    print_banner();
    run_stdin_router(&controller, &provider, &speech).await;

    controller.cancel_token().cancel();
    let _ = listener_handle.await;
    info!(target: LOG_TARGET, "Shutdown complete");
}

fn init_tracing(file_logging: bool) {
    let file_layer = if file_logging {
        let path = sangkamp_core::log_file_path();
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            Ok(file) => Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_ansi(false),
            ),
            Err(e) => {
                eprintln!("Could not open log file {}: {e}", path.display());
                None
            }
        }
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();
}

fn print_banner() {
    println!("Sangkamp — gæt årstallet!");
    println!("Skriv det holdene råber som almindelige linjer.");
    println!("Værtshandlinger starter med ':' — se :help for listen.");

    let themes = ThemeStore::open_default();
    if !themes.themes().is_empty() {
        println!("Gemte temaer:");
        for theme in themes.themes() {
            println!("  - {}", theme.text);
        }
    }
}

fn print_help() {
    println!(":start Hold 1, Hold 2, ...   start et spil med de hold");
    println!(":decade <årti>               fx ':decade 80erne' ('Alle' = blandet)");
    println!(":genre <genre>               fx ':genre Pop' ('Alle' = blandet)");
    println!(":difficulty easy|medium|hard sværhedsgrad");
    println!(":theme <tekst>               frit tema for næste spilleliste");
    println!(":themes                      vis gemte temaer");
    println!(":correct / :wrong            døm det aktive holds gæt");
    println!(":next                        videre til næste runde");
    println!(":reset                       tilbage til opsætning");
    println!(":quit                        afslut");
}

/// One parsed `:`-prefixed host action.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Start(&'a str),
    Decade(&'a str),
    Genre(&'a str),
    DifficultyLevel(&'a str),
    Theme(&'a str),
    Themes,
    Correct,
    Wrong,
    Next,
    Reset,
    Help,
    Quit,
    Unknown(&'a str),
}

fn parse_command(line: &str) -> Option<Command<'_>> {
    let rest = line.strip_prefix(':')?;
    let (verb, arg) = match rest.split_once(char::is_whitespace) {
        Some((verb, arg)) => (verb, arg.trim()),
        None => (rest.trim(), ""),
    };
    Some(match verb {
        "start" => Command::Start(arg),
        "decade" => Command::Decade(arg),
        "genre" => Command::Genre(arg),
        "difficulty" => Command::DifficultyLevel(arg),
        "theme" => Command::Theme(arg),
        "themes" => Command::Themes,
        "correct" => Command::Correct,
        "wrong" => Command::Wrong,
        "next" => Command::Next,
        "reset" => Command::Reset,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => Command::Unknown(other),
    })
}

fn parse_difficulty(arg: &str) -> Option<Difficulty> {
    match arg.to_lowercase().as_str() {
        "easy" => Some(Difficulty::Easy),
        "medium" => Some(Difficulty::Medium),
        "hard" => Some(Difficulty::Hard),
        _ => None,
    }
}

/// Read stdin on a dedicated thread; tokio's reactor never blocks on it.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

async fn run_stdin_router(
    controller: &Arc<SessionController>,
    provider: &Arc<dyn ContentProvider>,
    speech: &Arc<SpeechFeed>,
) {
    let cancel = controller.cancel_token();
    let mut lines = spawn_stdin_reader();
    let mut themes = ThemeStore::open_default();
    let mut settings = GameSettings::default();

    loop {
        let line = tokio::select! {
            () = cancel.cancelled() => break,
            line = lines.recv() => match line {
                Some(line) => line,
                None => break,
            },
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(command) = parse_command(line) else {
            // everything that is not a host action counts as heard speech
            speech.push(line).await;
            continue;
        };

        match command {
            Command::Start(arg) => {
                let names: Vec<String> = arg
                    .split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(String::from)
                    .collect();
                println!("Henter spilleliste...");
                if let Err(e) = controller.start_game(&names, settings.clone()).await {
                    println!("Kunne ikke starte: {e}");
                }
            }
            Command::Decade(arg) if !arg.is_empty() => {
                settings.decade = arg.to_string();
                println!("Årti: {}", settings.decade);
            }
            Command::Genre(arg) if !arg.is_empty() => {
                settings.genre = arg.to_string();
                println!("Genre: {}", settings.genre);
            }
            Command::DifficultyLevel(arg) => match parse_difficulty(arg) {
                Some(difficulty) => {
                    settings.difficulty = difficulty;
                    println!("Sværhedsgrad: {difficulty}");
                }
                None => println!("Ukendt sværhedsgrad '{arg}' (easy, medium eller hard)"),
            },
            Command::Theme(arg) if !arg.is_empty() => {
                settings.custom_category = Some(arg.to_string());
                if let Err(e) = themes.add(arg) {
                    warn!(target: LOG_TARGET, "Could not save theme: {}", e);
                }
                match provider.validate_custom_category(arg).await {
                    Ok(reply) => println!("{reply}"),
                    Err(e) => warn!(target: LOG_TARGET, "Theme check failed: {}", e),
                }
            }
            Command::Themes => {
                if themes.themes().is_empty() {
                    println!("Ingen gemte temaer.");
                }
                for theme in themes.themes() {
                    println!("  - {}", theme.text);
                }
            }
            Command::Correct => controller.record_guess(true).await,
            Command::Wrong => controller.record_guess(false).await,
            Command::Next => controller.advance_round().await,
            Command::Reset => controller.reset().await,
            Command::Help => print_help(),
            Command::Quit => break,
            Command::Decade(_) | Command::Genre(_) | Command::Theme(_) => {
                println!("Kommandoen mangler et argument.");
            }
            Command::Unknown(verb) => {
                println!("Ukendt kommando ':{verb}' — se :help.");
            }
        }
    }
}

async fn log_session_events(controller: Arc<SessionController>) {
    let mut events = controller.subscribe();
    loop {
        match events.recv().await {
            Ok(event) => print_event(&controller, event).await,
            Err(broadcast::error::RecvError::Lagged(_)) => {}
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn print_event(controller: &Arc<SessionController>, event: SessionEvent) {
    match event {
        SessionEvent::PlaylistReady { count } => {
            println!("Spilleliste klar: {count} sange.");
        }
        SessionEvent::RoundIntro { round } => {
            println!();
            println!("=== Runde {round} ===");
        }
        SessionEvent::CountdownTick { value } if value > 0 => {
            println!("{value}...");
        }
        SessionEvent::CountdownTick { .. } => {
            println!("Nu!");
        }
        SessionEvent::PlaybackStarted { .. } => {
            println!("Musikken spiller! Råb jeres holdnavn for at svare.");
        }
        SessionEvent::BuzzedIn { player } => {
            println!("{player} svarer! Hvilket år er sangen fra?");
        }
        SessionEvent::GuessJudged { player, correct } => {
            let state = controller.state().await;
            if let Some(card) = &state.current_card {
                println!("Sangen var: {} — {} ({})", card.artist, card.title, card.year);
            }
            if correct {
                println!("{player} rammer rigtigt og får {POINTS_PER_CORRECT} point!");
            } else {
                println!("{player} gætter forkert.");
            }
            for player in &state.players {
                println!("  {}: {} point", player.name, player.score);
            }
        }
        SessionEvent::TriviaReady { text } if !text.is_empty() => {
            println!("{text}");
        }
        SessionEvent::TriviaReady { .. } => {}
        SessionEvent::GameOver { winner } => {
            let state = controller.state().await;
            println!();
            println!("=== Spillet er slut ===");
            for player in &state.players {
                println!("{}: {} point", player.name, player.score);
                for song in &player.timeline {
                    println!("  {} — {} ({})", song.year, song.title, song.artist);
                }
            }
            match winner {
                Some(winner) => println!("Vinderen er {winner}! Sig 'nyt spil' for at spille igen."),
                None => println!("Ingen vinder denne gang."),
            }
        }
        SessionEvent::SessionReset => {
            println!("Klar til et nyt spil — brug :start når holdene er klar.");
        }
        SessionEvent::Error { message } => {
            println!("Fejl: {message}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_verbs_and_args() {
        assert_eq!(
            parse_command(":start Hold 1, Hold 2"),
            Some(Command::Start("Hold 1, Hold 2"))
        );
        assert_eq!(parse_command(":correct"), Some(Command::Correct));
        assert_eq!(parse_command(":theme 80er pop"), Some(Command::Theme("80er pop")));
        assert_eq!(parse_command(":quit"), Some(Command::Quit));
        assert_eq!(parse_command(":hvad"), Some(Command::Unknown("hvad")));
    }

    #[test]
    fn test_plain_lines_are_not_commands() {
        assert_eq!(parse_command("hold 1 er klar"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn test_parse_difficulty_levels() {
        assert_eq!(parse_difficulty("Easy"), Some(Difficulty::Easy));
        assert_eq!(parse_difficulty("hard"), Some(Difficulty::Hard));
        assert_eq!(parse_difficulty("umulig"), None);
    }
}
