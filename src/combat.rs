pub mod definitions;
pub mod prompts;
pub mod resolver;
pub mod sources;

pub use definitions::{
    AdjudicationError, CombatConfig, CombatRequest, DecisionSource, FailurePolicy, NarrationSink,
    ResolverState, Verdict, VictoryPolicy,
};
pub use resolver::CombatResolver;
pub use sources::{DiceOracle, TerminalNarrator};
