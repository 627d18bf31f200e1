use crate::combat::definitions::{CombatRequest, Verdict};

/// Tail of every verdict prompt; sources can use it to tell prompts apart.
pub const VERDICT_INSTRUCTION: &str =
    "State the outcome of the fight, only say win or lost. Do not respond with anything else";

pub fn verdict_prompt(request: &CombatRequest) -> String {
    format!(
        "Determine the outcome of the following fight from {} to {}. {}",
        request.attacker.descriptor(),
        request.defender.descriptor(),
        VERDICT_INSTRUCTION
    )
}

pub fn narrative_prompt(request: &CombatRequest, verdict: Verdict) -> String {
    let attacker = request.attacker.descriptor();
    let defender = request.defender.descriptor();
    match verdict {
        Verdict::AttackerWins => format!(
            "Write a short line speaking like a {attacker} attacking {defender} in a medieval war"
        ),
        Verdict::DefenderWins => format!(
            "Write a short line speaking like a {defender} successfully fighting back {attacker} in a medieval war"
        ),
    }
}

pub fn is_verdict_prompt(text: &str) -> bool {
    text.contains(VERDICT_INSTRUCTION)
}

/// Plain substring match, so "winter" is a win too.
pub fn classify_verdict(response: &str) -> Verdict {
    if response.contains("win") {
        Verdict::AttackerWins
    } else {
        Verdict::DefenderWins
    }
}

/// Models like to wrap their lines in quotes.
pub fn trim_quotes(text: &str) -> &str {
    text.trim().trim_matches('"')
}

pub fn fallback_narrative(request: &CombatRequest, verdict: Verdict) -> String {
    let winner = request.winner(verdict);
    let loser = request.loser(verdict);
    format!(
        "The {} stands over the fallen {}!",
        winner.descriptor().to_lowercase(),
        loser.descriptor().to_lowercase()
    )
}

pub const STOCK_LINES: [&str; 6] = [
    "\"For the crown! Yield or fall!\"",
    "\"Your steel is dull and your heart is weaker.\"",
    "\"I have held this ground since dawn, I will not give it now.\"",
    "\"Sing of me tonight, for this blow ends you.\"",
    "\"The field remembers only the ones left standing.\"",
    "\"Is that all your master taught you?\"",
];
