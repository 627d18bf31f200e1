use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use battle_chess::combat::{
    CombatConfig, CombatResolver, DecisionSource, DiceOracle, FailurePolicy, TerminalNarrator,
    VictoryPolicy,
};
use battle_chess::{Board, Game, GameEvent, GameSession, InputEvent, Square};
#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

const INTRO: &str = "As the commander of a medieval army you must be patient: \
the battlefield reports every encounter in due time, and every piece has a mind of its own. \
Pick a square (`e2` or `4,1`) to select, then a destination. \
An empty line hurries the narrator, `q` quits.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let config = config_from_env()?;
    debug!("Combat config: {:?}", config);
    let char_delay = env_millis("BATTLE_CHESS_CHAR_DELAY_MS")?.unwrap_or(Duration::from_millis(25));
    let narrator = Arc::new(TerminalNarrator::new(char_delay));
    let resolver = CombatResolver::new(decision_source().await?, narrator.clone(), config);
    let mut session = GameSession::new(Game::new(), resolver);
    let events = session.subscribe();

    println!("{}\n", INTRO);
    let mirror = session.game().board().clone();
    println!("{}", mirror);
    tokio::spawn(print_events(mirror, events));

    let (input_tx, input_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim();
            if line.is_empty() {
                // Enter on its own skips the line being typed out.
                narrator.quick_finish();
                continue;
            }
            if line.eq_ignore_ascii_case("q") {
                break;
            }
            match Square::from_str(line) {
                Ok(square) => {
                    if input_tx.send(InputEvent::Select(square)).is_err() {
                        break;
                    }
                }
                Err(err) => println!("{}", err),
            }
        }
    });

    session.run(UnboundedReceiverStream::new(input_rx)).await;
    let score = session.game().scoreboard();
    info!(
        "Leaving after {} games, White {} / Black {}",
        score.games_played(),
        score.white_wins,
        score.black_wins
    );
    Ok(())
}

/// Keeps its own copy of the board in sync with the session's notifications.
async fn print_events(mut board: Board, mut events: mpsc::UnboundedReceiver<GameEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            GameEvent::Selected {
                square,
                destinations,
            } => {
                if let Some(piece) = board.get(square) {
                    let targets: Vec<String> =
                        destinations.squares().map(|sq| sq.to_string()).collect();
                    println!(
                        "{} {} on {} -> {}",
                        piece.color,
                        piece.descriptor(),
                        square,
                        targets.join(" ")
                    );
                }
            }
            GameEvent::SelectionCleared => trace!("Selection cleared"),
            GameEvent::PieceMoved { from, to } => {
                board.relocate(from, to);
            }
            GameEvent::PieceRemoved(piece) => {
                board.take(piece.position);
            }
            GameEvent::PieceSpawned(piece) => {
                board.place(piece);
            }
            GameEvent::CombatStarted { attacker, defender } => println!(
                "You command the {} to attack the enemy {}!",
                attacker.descriptor().to_lowercase(),
                defender.descriptor().to_lowercase()
            ),
            GameEvent::CombatResolved { winner, .. } => {
                println!("{} wins the fight!", winner.descriptor())
            }
            GameEvent::CombatAborted(reason) => println!("The battle was called off: {}", reason),
            GameEvent::TurnChanged(color) => {
                board.set_side_to_move(color);
                println!("\n{}", board);
            }
            GameEvent::GameOver(winner) => println!("{} wins!\n\n", winner),
            GameEvent::BoardReset => {
                board.clear();
            }
        }
    }
}

fn config_from_env() -> anyhow::Result<CombatConfig> {
    let mut config = CombatConfig::default();
    if let Ok(value) = env::var("BATTLE_CHESS_VICTORY") {
        config = config.with_victory(VictoryPolicy::from_str(&value)?);
    }
    if let Ok(value) = env::var("BATTLE_CHESS_ON_FAILURE") {
        config = config.with_failure_policy(FailurePolicy::from_str(&value)?);
    }
    if let Some(timeout) = env_millis("BATTLE_CHESS_VERDICT_TIMEOUT_MS")? {
        config = config.with_verdict_timeout(timeout);
    }
    if let Some(timeout) = env_millis("BATTLE_CHESS_NARRATIVE_TIMEOUT_MS")? {
        config = config.with_narrative_timeout(timeout);
    }
    if let Some(timeout) = env_millis("BATTLE_CHESS_NARRATION_TIMEOUT_MS")? {
        config = config.with_narration_timeout(timeout);
    }
    if let Some(interval) = env_millis("BATTLE_CHESS_POLL_MS")? {
        config = config.with_poll_interval(interval);
    }
    Ok(config)
}

fn env_millis(key: &str) -> anyhow::Result<Option<Duration>> {
    env::var(key)
        .ok()
        .map(|value| {
            value
                .parse::<u64>()
                .map(Duration::from_millis)
                .with_context(|| format!("{} must be a number of milliseconds", key))
        })
        .transpose()
}

#[cfg(feature = "network")]
async fn decision_source() -> anyhow::Result<Arc<dyn DecisionSource>> {
    use battle_chess::oracle::{model::DEFAULT_MODEL, LocalModel, RemoteOracle};
    use url::Url;

    let Some(link) = env::args().nth(1) else {
        return Ok(Arc::new(DiceOracle::new()));
    };
    let url = Url::from_str(&link).context("Failed to parse oracle link")?;
    match url.scheme() {
        // Talk to a local model server directly.
        "http" | "https" => {
            let name = env::var("BATTLE_CHESS_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
            let model = LocalModel::new(&url, name).context("Failed to build model endpoint")?;
            info!("Fights are adjudicated by the model at {}", model.endpoint());
            Ok(Arc::new(model))
        }
        _ => {
            let oracle = RemoteOracle::connect(url)
                .await
                .context("Failed to connect to oracle")?;
            Ok(Arc::new(oracle))
        }
    }
}

#[cfg(not(feature = "network"))]
async fn decision_source() -> anyhow::Result<Arc<dyn DecisionSource>> {
    if let Some(link) = env::args().nth(1) {
        warn!("Built without `network` feature, ignoring oracle link {}", link);
    }
    Ok(Arc::new(DiceOracle::new()))
}
