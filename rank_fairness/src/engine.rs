//! The common interface of the voting rules.

use log::info;
use snafu::ensure;

use crate::config::*;
use crate::profile::Profile;
use crate::scoring::{ScoringEngine, ScoringRule};
use crate::stv::StvEngine;

/// A voting rule: turns a profile into a full ranking and a winner set.
///
/// Engines are immutable and deterministic. Running the same engine twice on
/// the same profile returns the same outcome, which is what the fairness scores
/// rely on when comparing a profile with its reduced versions.
pub trait VotingRuleEngine: Send + Sync {
    /// The name of the rule, as accepted by [RuleName].
    fn name(&self) -> String;

    fn tiebreak_mode(&self) -> TieBreakMode;

    /// Ranks all the candidates of the profile and elects the first `seats`.
    ///
    /// Fails with a configuration error if `seats` is zero or larger than the
    /// number of candidates.
    fn run(&self, profile: &Profile, seats: u32) -> Result<ElectionOutcome, FairnessError>;
}

/// Builds the engine for a rule.
///
/// `num_candidates` is the number of candidates of the profiles the engine
/// will be used on. It is only checked against the k of k-approval.
///
/// ```
/// # use rank_fairness::*;
/// let engine = build_voting_rule(4, &"2-approval".parse::<RuleName>()?, TieBreakMode::Lexicographic)?;
/// assert_eq!(engine.name(), "2-approval");
/// assert!(build_voting_rule(1, &RuleName::Approval(2), TieBreakMode::Lexicographic).is_err());
/// # Ok::<(), FairnessError>(())
/// ```
pub fn build_voting_rule(
    num_candidates: usize,
    rule: &RuleName,
    tiebreak: TieBreakMode,
) -> Result<Box<dyn VotingRuleEngine>, FairnessError> {
    info!(
        "build_voting_rule: {} with {} tiebreak for {} candidates",
        rule, tiebreak, num_candidates
    );
    let engine: Box<dyn VotingRuleEngine> = match rule {
        RuleName::Borda => Box::new(ScoringEngine::borda(tiebreak)),
        RuleName::Plurality => Box::new(ScoringEngine::plurality(tiebreak)),
        RuleName::Approval(k) => {
            ensure!(
                num_candidates >= *k,
                TooFewCandidatesSnafu {
                    k: *k,
                    num_candidates
                }
            );
            Box::new(ScoringEngine::new(ScoringRule::Approval(*k), tiebreak)?)
        }
        RuleName::Stv => Box::new(StvEngine::new(tiebreak)),
    };
    Ok(engine)
}

pub(crate) fn check_seats(seats: u32, num_candidates: usize) -> Result<(), FairnessError> {
    ensure!(
        seats >= 1 && (seats as usize) <= num_candidates,
        InvalidSeatsSnafu {
            seats,
            num_candidates
        }
    );
    Ok(())
}

pub(crate) fn outcome_from_ranking(ranking: Vec<Candidate>, seats: u32) -> ElectionOutcome {
    let winners = ranking.iter().take(seats as usize).cloned().collect();
    ElectionOutcome {
        ranking,
        winners,
        scores: Vec::new(),
        quota: None,
        round_stats: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_all_rules() {
        for name in ["borda", "plurality", "stv", "1-approval", "3-approval"] {
            let rule: RuleName = name.parse().unwrap();
            let engine = build_voting_rule(3, &rule, TieBreakMode::Borda).unwrap();
            assert_eq!(engine.name(), name);
            assert_eq!(engine.tiebreak_mode(), TieBreakMode::Borda);
        }
    }

    #[test]
    fn build_errors() {
        let err = build_voting_rule(2, &RuleName::Approval(3), TieBreakMode::Lexicographic)
            .err()
            .unwrap();
        assert_eq!(
            err,
            FairnessError::TooFewCandidates {
                k: 3,
                num_candidates: 2
            }
        );
        let zero = build_voting_rule(2, &RuleName::Approval(0), TieBreakMode::Lexicographic);
        assert_eq!(zero.err().map(|e| e.kind()), Some(ErrorKind::Configuration));
    }

    #[test]
    fn seats_bounds() {
        assert!(check_seats(1, 1).is_ok());
        assert!(check_seats(0, 3).is_err());
        assert_eq!(
            check_seats(4, 3),
            Err(FairnessError::InvalidSeats {
                seats: 4,
                num_candidates: 3
            })
        );
    }
}
