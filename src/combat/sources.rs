use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use log::trace;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::combat::definitions::{AdjudicationError, DecisionSource, NarrationSink};
use crate::combat::prompts::{is_verdict_prompt, STOCK_LINES};
use crate::core::definitions::Square;

/// Offline stand-in for the model: coin-flip verdicts and stock battle cries.
pub struct DiceOracle {
    rng: Mutex<StdRng>,
    latency: Duration,
}

impl DiceOracle {
    pub fn new() -> Self {
        DiceOracle {
            rng: Mutex::new(StdRng::from_entropy()),
            latency: Duration::ZERO,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        DiceOracle {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            latency: Duration::ZERO,
        }
    }

    /// Pretend to think for a while before every answer.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn answer(&self, prompt: &str) -> Result<String, AdjudicationError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| AdjudicationError::Source("oracle rng poisoned".to_string()))?;
        let answer = if is_verdict_prompt(prompt) {
            if rng.gen_bool(0.5) { "win" } else { "lost" }
        } else {
            STOCK_LINES.choose(&mut *rng).copied().unwrap_or("\"...\"")
        };
        Ok(answer.to_string())
    }
}

impl Default for DiceOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionSource for DiceOracle {
    fn prompt(&self, text: String) -> BoxFuture<'_, Result<String, AdjudicationError>> {
        async move {
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            let answer = self.answer(&text);
            trace!("Dice oracle answered {:?} to {:?}", answer, text);
            answer
        }
        .boxed()
    }
}

/// Chat bubble for a terminal: types the line out character by character.
pub struct TerminalNarrator {
    writing: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
    char_delay: Duration,
}

impl TerminalNarrator {
    pub fn new(char_delay: Duration) -> Self {
        TerminalNarrator {
            writing: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
            char_delay,
        }
    }

    /// Skip the animation of the line being written.
    pub fn quick_finish(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.writing.store(false, Ordering::SeqCst);
    }
}

impl NarrationSink for TerminalNarrator {
    fn show_dialogue(&self, text: &str, anchor: Square) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.writing.store(true, Ordering::SeqCst);

        let text = format!("[{}] {}", anchor, text);
        let writing = Arc::clone(&self.writing);
        let current = Arc::clone(&self.generation);
        let delay = self.char_delay;
        tokio::spawn(async move {
            let mut stdout = std::io::stdout();
            let _ = writeln!(stdout);
            for ch in text.chars() {
                if current.load(Ordering::SeqCst) != generation {
                    return;
                }
                let _ = write!(stdout, "{}", ch);
                let _ = stdout.flush();
                tokio::time::sleep(delay).await;
            }
            if current.load(Ordering::SeqCst) == generation {
                writing.store(false, Ordering::SeqCst);
            }
        });
    }

    fn close_dialogue(&self) {
        println!();
    }

    fn is_writing(&self) -> bool {
        self.writing.load(Ordering::SeqCst)
    }
}
