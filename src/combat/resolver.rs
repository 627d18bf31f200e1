use std::sync::Arc;

use log::{debug, error, info, warn};
use rand::Rng;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};

use crate::combat::definitions::*;
use crate::combat::prompts::{
    classify_verdict, fallback_narrative, narrative_prompt, trim_quotes, verdict_prompt,
};
use crate::core::engine::Piece;

const WAITING_LINE: &str = "Waiting for result...";

/// Settles contested captures. Its state is the game's input lock.
pub struct CombatResolver {
    source: Arc<dyn DecisionSource>,
    narration: Arc<dyn NarrationSink>,
    config: CombatConfig,
    state: watch::Sender<ResolverState>,
}

/// Holds the lock for one combat, back to `Idle` on drop.
struct ControlLock<'a> {
    state: &'a watch::Sender<ResolverState>,
}

impl ControlLock<'_> {
    fn advance(&self, next: ResolverState) {
        let previous = self.state.send_replace(next);
        debug!("Combat resolver: {:?} -> {:?}", previous, next);
    }
}

impl Drop for ControlLock<'_> {
    fn drop(&mut self) {
        self.advance(ResolverState::Idle);
    }
}

impl CombatResolver {
    pub fn new(
        source: Arc<dyn DecisionSource>,
        narration: Arc<dyn NarrationSink>,
        config: CombatConfig,
    ) -> Self {
        let (state, _) = watch::channel(ResolverState::Idle);
        CombatResolver {
            source,
            narration,
            config,
            state,
        }
    }

    pub fn state(&self) -> ResolverState {
        *self.state.borrow()
    }

    pub fn is_locked(&self) -> bool {
        self.state().is_locked()
    }

    /// Lets a UI follow lock transitions.
    pub fn subscribe(&self) -> watch::Receiver<ResolverState> {
        self.state.subscribe()
    }

    pub async fn resolve_combat(
        &self,
        attacker: Piece,
        defender: Piece,
    ) -> Result<Verdict, AdjudicationError> {
        let request = CombatRequest { attacker, defender };
        let lock = self.lock()?;
        info!(
            "{} {} attacks {} {}",
            attacker.color,
            attacker.descriptor(),
            defender.color,
            defender.descriptor()
        );

        self.narration
            .show_dialogue(WAITING_LINE, request.attacker.position);
        let verdict = match self.adjudicate(&request).await {
            Ok(verdict) => verdict,
            Err(err) => {
                self.narration.close_dialogue();
                return Err(err);
            }
        };
        info!(
            "{} wins the fight!",
            request.winner(verdict).descriptor()
        );

        lock.advance(ResolverState::Narrating);
        self.narrate(&request, verdict).await;
        Ok(verdict)
    }

    fn lock(&self) -> Result<ControlLock<'_>, AdjudicationError> {
        let acquired = self.state.send_if_modified(|state| {
            if *state == ResolverState::Idle {
                *state = ResolverState::AwaitingVerdict;
                true
            } else {
                false
            }
        });
        if acquired {
            debug!("Combat resolver: Idle -> AwaitingVerdict");
            Ok(ControlLock { state: &self.state })
        } else {
            warn!("Combat requested while resolver is {:?}", self.state());
            Err(AdjudicationError::Busy)
        }
    }

    async fn adjudicate(&self, request: &CombatRequest) -> Result<Verdict, AdjudicationError> {
        if self.config.victory == VictoryPolicy::CoinFlip {
            return Ok(coin_flip());
        }
        match (self.ask_verdict(request).await, self.config.on_failure) {
            (Ok(verdict), _) => Ok(verdict),
            (Err(err), FailurePolicy::CoinFlip) => {
                warn!("Adjudication failed ({}), settling with a coin flip", err);
                Ok(coin_flip())
            }
            (Err(err), FailurePolicy::Abort) => {
                error!("Adjudication failed: {}", err);
                Err(err)
            }
        }
    }

    async fn ask_verdict(&self, request: &CombatRequest) -> Result<Verdict, AdjudicationError> {
        let limit = self.config.verdict_timeout;
        let response = timeout(limit, self.source.prompt(verdict_prompt(request)))
            .await
            .map_err(|_| AdjudicationError::Timeout(limit))??;
        debug!("Raw verdict: {:?}", response);
        Ok(classify_verdict(&response))
    }

    async fn narrate(&self, request: &CombatRequest, verdict: Verdict) {
        let limit = self.config.narrative_timeout;
        let line = match timeout(limit, self.source.prompt(narrative_prompt(request, verdict))).await
        {
            Ok(Ok(text)) if !trim_quotes(&text).is_empty() => trim_quotes(&text).to_string(),
            Ok(Ok(_)) => fallback_narrative(request, verdict),
            Ok(Err(err)) => {
                warn!("Narrative prompt failed: {}", err);
                fallback_narrative(request, verdict)
            }
            Err(_) => {
                warn!("Narrative prompt timed out after {:?}", limit);
                fallback_narrative(request, verdict)
            }
        };
        self.narration
            .show_dialogue(&line, request.winner(verdict).position);
        self.wait_for_narration().await;
        self.narration.close_dialogue();
    }

    async fn wait_for_narration(&self) {
        let interval = self.config.poll_interval;
        let polling = async {
            while self.narration.is_writing() {
                sleep(interval).await;
            }
        };
        if timeout(self.config.narration_timeout, polling).await.is_err() {
            warn!(
                "Narration still writing after {:?}, releasing control anyway",
                self.config.narration_timeout
            );
        }
    }
}

fn coin_flip() -> Verdict {
    if rand::thread_rng().gen_bool(0.5) {
        Verdict::AttackerWins
    } else {
        Verdict::DefenderWins
    }
}
