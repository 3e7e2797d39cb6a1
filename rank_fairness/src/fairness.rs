//! Fairness scores of a voting rule on a profile.
//!
//! All the scores are between 0 and 1, and 1 is the fairest.
//!
//! * σ_IIA measures independence of irrelevant alternatives: how much the
//!   ranking of the other candidates moves when one candidate (or a subset of
//!   candidates) is removed from the election.
//! * σ_UM measures majoritarian alignment: how large the minority of voters that
//!   disagrees with the order of two candidates in the ranking can be.

use log::{debug, info};
use snafu::ensure;
use std::collections::BTreeSet;
use std::f64::consts::PI;
use std::fmt::Display;
use std::str::FromStr;

use crate::config::*;
use crate::distance::{inversion_distance, SupportMatrix};
use crate::engine::VotingRuleEngine;
use crate::profile::Profile;

/// The largest number of candidates for [sigma_iia_all_subsets].
pub const MAX_ALL_SUBSETS_CANDIDATES: usize = 16;

/// The effect of removing some candidates from the election.
#[derive(PartialEq, Debug, Clone)]
pub struct RemovalTerm {
    pub removed: Vec<Candidate>,
    /// The number of seats of the counterfactual election.
    pub seats: u32,
    /// Inversion distance for σ_IIA, overlap of the winner sets for the winner
    /// set variant.
    pub value: f64,
}

fn pairs(n: usize) -> f64 {
    (n * n.saturating_sub(1) / 2) as f64
}

// The inversion distance between the ranking of the reduced profile and the
// original ranking restricted to the remaining candidates.
fn removal_distance<E: VotingRuleEngine + ?Sized>(
    profile: &Profile,
    engine: &E,
    seats: u32,
    full_ranking: &[Candidate],
    removed: &BTreeSet<Candidate>,
) -> Result<RemovalTerm, FairnessError> {
    let reduced = profile.remove(removed);
    let remaining = reduced.num_candidates();
    let seats_after = seats.min(remaining as u32);
    let distance = if remaining < 2 {
        0
    } else {
        let counterfactual = engine.run(&reduced, seats_after)?;
        let expected: Vec<Candidate> = full_ranking
            .iter()
            .filter(|c| !removed.contains(*c))
            .cloned()
            .collect();
        inversion_distance(&counterfactual.ranking, &expected)?
    };
    debug!(
        "removal_distance: removing {:?}: distance {}",
        removed, distance
    );
    Ok(RemovalTerm {
        removed: removed.iter().cloned().collect(),
        seats: seats_after,
        value: distance as f64,
    })
}

/// The inversion distance caused by the removal of each candidate, in
/// candidate order.
pub fn sigma_iia_terms<E: VotingRuleEngine + ?Sized>(
    profile: &Profile,
    engine: &E,
    seats: u32,
) -> Result<Vec<RemovalTerm>, FairnessError> {
    let full = engine.run(profile, seats)?;
    profile
        .candidates()
        .iter()
        .map(|c| {
            let removed = BTreeSet::from([c.clone()]);
            removal_distance(profile, engine, seats, &full.ranking, &removed)
        })
        .collect()
}

/// σ_IIA: one minus the total distance caused by removing each candidate in
/// turn, relative to the largest possible total `n * (n-1)(n-2)/2`.
///
/// The number of seats stays the same in the reduced elections, unless fewer
/// candidates remain. Profiles with fewer than 3 candidates score 1.
///
/// ```
/// # use rank_fairness::*;
/// # use rank_fairness::builder::ProfileBuilder;
/// let mut builder = ProfileBuilder::new();
/// builder.add_ballot(&[vec!["A"], vec!["B"], vec!["C"]], 5)?;
/// builder.add_ballot(&[vec!["B"], vec!["A"], vec!["C"]], 3)?;
/// builder.add_ballot(&[vec!["C"], vec!["A"], vec!["B"]], 2)?;
/// let profile = builder.build()?;
/// let engine = build_voting_rule(3, &RuleName::Borda, TieBreakMode::Lexicographic)?;
/// assert_eq!(sigma_iia(&profile, engine.as_ref(), 1)?, 1.0);
/// # Ok::<(), FairnessError>(())
/// ```
pub fn sigma_iia<E: VotingRuleEngine + ?Sized>(
    profile: &Profile,
    engine: &E,
    seats: u32,
) -> Result<f64, FairnessError> {
    let n = profile.num_candidates();
    let terms = sigma_iia_terms(profile, engine, seats)?;
    let max_total = n as f64 * pairs(n.saturating_sub(1));
    if max_total == 0.0 {
        return Ok(1.0);
    }
    let total: f64 = terms.iter().map(|t| t.value).sum();
    let score = 1.0 - total / max_total;
    info!("sigma_iia: {}: {}", engine.name(), score);
    Ok(score)
}

/// σ_IIA over every subset of removed candidates that leaves at least two
/// candidates.
///
/// The distance of each subset is normalized by the largest distance between
/// the remaining candidates, and the normalized distances are averaged.
/// There are `2^n` subsets, so this is limited to
/// [MAX_ALL_SUBSETS_CANDIDATES] candidates.
pub fn sigma_iia_all_subsets<E: VotingRuleEngine + ?Sized>(
    profile: &Profile,
    engine: &E,
    seats: u32,
) -> Result<f64, FairnessError> {
    let candidates: Vec<&Candidate> = profile.candidates().iter().collect();
    let n = candidates.len();
    ensure!(
        n <= MAX_ALL_SUBSETS_CANDIDATES,
        TooManyCandidatesSnafu {
            num_candidates: n,
            max: MAX_ALL_SUBSETS_CANDIDATES
        }
    );
    let full = engine.run(profile, seats)?;
    if n < 3 {
        return Ok(1.0);
    }
    let mut total = 0.0;
    let mut count: u64 = 0;
    for mask in 1u32..(1u32 << n) {
        let size = mask.count_ones() as usize;
        if size > n - 2 {
            continue;
        }
        let removed: BTreeSet<Candidate> = candidates
            .iter()
            .enumerate()
            .filter(|(idx, _)| mask & (1u32 << *idx) != 0)
            .map(|(_, c)| (*c).clone())
            .collect();
        let term = removal_distance(profile, engine, seats, &full.ranking, &removed)?;
        total += term.value / pairs(n - size);
        count += 1;
    }
    let score = 1.0 - total / count as f64;
    info!(
        "sigma_iia_all_subsets: {}: {} over {} subsets",
        engine.name(),
        score,
        count
    );
    Ok(score)
}

/// The share of the winners that stay elected when each candidate is removed.
///
/// When a winner is removed, the reduced election has one seat less. Removing
/// the only winner leaves no seat to compare and counts as 1.
pub fn sigma_iia_winner_set_terms<E: VotingRuleEngine + ?Sized>(
    profile: &Profile,
    engine: &E,
    seats: u32,
) -> Result<Vec<RemovalTerm>, FairnessError> {
    let winners = engine.run(profile, seats)?.winner_set();
    let mut terms: Vec<RemovalTerm> = Vec::with_capacity(profile.num_candidates());
    for c in profile.candidates() {
        let seats_after = if winners.contains(c) { seats - 1 } else { seats };
        let value = if seats_after == 0 {
            1.0
        } else {
            let removed = BTreeSet::from([c.clone()]);
            let after = engine.run(&profile.remove(&removed), seats_after)?.winner_set();
            let kept = winners.intersection(&after).count();
            kept as f64 / seats_after as f64
        };
        debug!(
            "sigma_iia_winner_set_terms: removing {}: {} seats, overlap {}",
            c, seats_after, value
        );
        terms.push(RemovalTerm {
            removed: vec![c.clone()],
            seats: seats_after,
            value,
        });
    }
    Ok(terms)
}

/// σ_IIA on winner sets: the average of [sigma_iia_winner_set_terms].
pub fn sigma_iia_winner_set<E: VotingRuleEngine + ?Sized>(
    profile: &Profile,
    engine: &E,
    seats: u32,
) -> Result<f64, FairnessError> {
    let terms = sigma_iia_winner_set_terms(profile, engine, seats)?;
    let score = if terms.is_empty() {
        1.0
    } else {
        terms.iter().map(|t| t.value).sum::<f64>() / terms.len() as f64
    };
    info!("sigma_iia_winner_set: {}: {}", engine.name(), score);
    Ok(score)
}

/// Maps the smallest support of a ranked pair to a score.
///
/// A pair backed by at least half of the voters is fully aligned. Below that,
/// the score is `(2/π) asin(sqrt(2m))`.
pub fn um_score(misalignment: f64) -> f64 {
    if misalignment >= 0.5 {
        1.0
    } else {
        (2.0 / PI) * (2.0 * misalignment.max(0.0)).sqrt().asin()
    }
}

// The smallest support of `above` over `below` over the given pairs.
fn min_support<'a>(
    support: &SupportMatrix,
    pairs: impl Iterator<Item = (&'a Candidate, &'a Candidate)>,
) -> Result<f64, FairnessError> {
    let mut lowest: f64 = 1.0;
    for (above, below) in pairs {
        lowest = lowest.min(support.support(above, below)?);
    }
    Ok(lowest)
}

/// σ_UM: the alignment of the ranking with the majority on every pair of
/// candidates.
///
/// ```
/// # use rank_fairness::*;
/// # use rank_fairness::builder::ProfileBuilder;
/// let mut builder = ProfileBuilder::new();
/// builder.add_ballot_simple(&["A", "B", "C"])?;
/// builder.add_ballot_simple(&["B", "C", "A"])?;
/// builder.add_ballot_simple(&["C", "A", "B"])?;
/// let profile = builder.build()?;
/// let engine = build_voting_rule(3, &RuleName::Borda, TieBreakMode::Lexicographic)?;
/// let score = sigma_um(&profile, engine.as_ref(), 1)?;
/// assert!((score - 0.608).abs() < 1e-3);
/// # Ok::<(), FairnessError>(())
/// ```
pub fn sigma_um<E: VotingRuleEngine + ?Sized>(
    profile: &Profile,
    engine: &E,
    seats: u32,
) -> Result<f64, FairnessError> {
    let outcome = engine.run(profile, seats)?;
    let ranking: &[Candidate] = &outcome.ranking;
    let support = SupportMatrix::new(profile);
    let pairs = ranking
        .iter()
        .enumerate()
        .flat_map(move |(idx, a)| ranking[idx + 1..].iter().map(move |b| (a, b)));
    let lowest = min_support(&support, pairs)?;
    let score = um_score(lowest);
    info!(
        "sigma_um: {}: misalignment {}, score {}",
        engine.name(),
        lowest,
        score
    );
    Ok(score)
}

/// σ_UM restricted to the pairs of a winner and a candidate that was not
/// elected.
pub fn sigma_um_winner_set<E: VotingRuleEngine + ?Sized>(
    profile: &Profile,
    engine: &E,
    seats: u32,
) -> Result<f64, FairnessError> {
    let winners = engine.run(profile, seats)?.winner_set();
    let losers: Vec<&Candidate> = profile
        .candidates()
        .iter()
        .filter(|c| !winners.contains(*c))
        .collect();
    let losers: &[&Candidate] = &losers;
    let support = SupportMatrix::new(profile);
    let pairs = winners
        .iter()
        .flat_map(move |w| losers.iter().map(move |l| (w, *l)));
    let lowest = min_support(&support, pairs)?;
    let score = um_score(lowest);
    info!(
        "sigma_um_winner_set: {}: misalignment {}, score {}",
        engine.name(),
        lowest,
        score
    );
    Ok(score)
}

/// The fairness scores, by name.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, PartialOrd, Ord)]
pub enum Metric {
    SigmaIia,
    SigmaIiaAllSubsets,
    SigmaIiaWinnerSet,
    SigmaUm,
    SigmaUmWinnerSet,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::SigmaIia,
        Metric::SigmaIiaAllSubsets,
        Metric::SigmaIiaWinnerSet,
        Metric::SigmaUm,
        Metric::SigmaUmWinnerSet,
    ];

    pub fn compute<E: VotingRuleEngine + ?Sized>(
        &self,
        profile: &Profile,
        engine: &E,
        seats: u32,
    ) -> Result<f64, FairnessError> {
        match self {
            Metric::SigmaIia => sigma_iia(profile, engine, seats),
            Metric::SigmaIiaAllSubsets => sigma_iia_all_subsets(profile, engine, seats),
            Metric::SigmaIiaWinnerSet => sigma_iia_winner_set(profile, engine, seats),
            Metric::SigmaUm => sigma_um(profile, engine, seats),
            Metric::SigmaUmWinnerSet => sigma_um_winner_set(profile, engine, seats),
        }
    }
}

impl FromStr for Metric {
    type Err = FairnessError;

    fn from_str(s: &str) -> Result<Metric, FairnessError> {
        match s {
            "sigma_IIA" => Ok(Metric::SigmaIia),
            "sigma_IIA_all_subsets" => Ok(Metric::SigmaIiaAllSubsets),
            "sigma_IIA_winner_set" => Ok(Metric::SigmaIiaWinnerSet),
            "sigma_UM" => Ok(Metric::SigmaUm),
            "sigma_UM_winner_set" => Ok(Metric::SigmaUmWinnerSet),
            x => UnknownMetricSnafu { name: x }.fail(),
        }
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Metric::SigmaIia => "sigma_IIA",
            Metric::SigmaIiaAllSubsets => "sigma_IIA_all_subsets",
            Metric::SigmaIiaWinnerSet => "sigma_IIA_winner_set",
            Metric::SigmaUm => "sigma_UM",
            Metric::SigmaUmWinnerSet => "sigma_UM_winner_set",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ProfileBuilder;
    use crate::engine::build_voting_rule;
    use proptest::prelude::*;

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn profile(ballots: &[(&str, u64)]) -> Profile {
        let mut builder = ProfileBuilder::new();
        for (ranking, count) in ballots {
            let groups: Vec<Vec<String>> = ranking.chars().map(|c| vec![c.to_string()]).collect();
            builder.add_ballot(&groups, *count).unwrap();
        }
        builder.build().unwrap()
    }

    fn engine(name: &str, num_candidates: usize) -> Box<dyn VotingRuleEngine> {
        build_voting_rule(
            num_candidates,
            &name.parse::<RuleName>().unwrap(),
            TieBreakMode::Lexicographic,
        )
        .unwrap()
    }

    fn assert_close(left: f64, right: f64) {
        assert!(
            (left - right).abs() < 1e-3,
            "expected {} to be close to {}",
            left,
            right
        );
    }

    fn cyclic() -> Profile {
        profile(&[("ABC", 1), ("BCA", 1), ("CAB", 1)])
    }

    #[test]
    fn um_score_shape() {
        assert_eq!(um_score(0.5), 1.0);
        assert_eq!(um_score(0.9), 1.0);
        assert_eq!(um_score(0.0), 0.0);
        assert_close(um_score(1.0 / 3.0), 0.608);
        assert!(um_score(0.2) < um_score(0.3));
    }

    #[test]
    fn sigma_um_cyclic() {
        init_logs();
        let p = cyclic();
        for name in ["borda", "2-approval", "3-approval", "plurality"] {
            assert_close(sigma_um(&p, engine(name, 3).as_ref(), 1).unwrap(), 0.608);
        }
    }

    #[test]
    fn sigma_um_lopsided_plurality() {
        let p = profile(&[("ACB", 99), ("BCA", 1)]);
        let score = sigma_um(&p, engine("plurality", 3).as_ref(), 1).unwrap();
        assert_close(score, 0.0903);
    }

    #[test]
    fn sigma_um_majority_profile() {
        let p = profile(&[("ABC", 5), ("BAC", 3), ("CAB", 2)]);
        for name in ["borda", "plurality", "stv"] {
            assert_eq!(sigma_um(&p, engine(name, 3).as_ref(), 1), Ok(1.0));
            assert_eq!(sigma_iia(&p, engine(name, 3).as_ref(), 1), Ok(1.0));
        }
    }

    #[test]
    fn sigma_um_stv_four_candidates() {
        init_logs();
        let p = profile(&[("ABCD", 5), ("BACD", 3), ("DCAB", 2)]);
        let stv = engine("stv", 4);
        // D is ranked above C, with only 2 voters out of 10 agreeing.
        assert_close(sigma_um(&p, stv.as_ref(), 1).unwrap(), 0.436);
        for seats in [1, 2] {
            assert_eq!(sigma_um_winner_set(&p, stv.as_ref(), seats), Ok(1.0));
        }
        // Removing A or B swaps C and D in the reduced ranking.
        let terms = sigma_iia_terms(&p, stv.as_ref(), 1).unwrap();
        let distances: Vec<f64> = terms.iter().map(|t| t.value).collect();
        assert_eq!(distances, vec![1.0, 1.0, 0.0, 0.0]);
        assert_close(sigma_iia(&p, stv.as_ref(), 1).unwrap(), 1.0 - 2.0 / 12.0);
    }

    #[test]
    fn sigma_iia_winner_set_stv() {
        init_logs();
        let two_seats = profile(&[("ABC", 6), ("CAB", 4)]);
        let stv = engine("stv", 3);
        let terms = sigma_iia_winner_set_terms(&two_seats, stv.as_ref(), 2).unwrap();
        let seats: Vec<u32> = terms.iter().map(|t| t.seats).collect();
        assert_eq!(seats, vec![1, 2, 1]);
        assert_close(sigma_iia_winner_set(&two_seats, stv.as_ref(), 2).unwrap(), 2.0 / 3.0);

        // Removing the only winner leaves no seat, which counts as unchanged.
        let one_seat = profile(&[("ABC", 7), ("BCA", 2), ("CAB", 1)]);
        assert_eq!(sigma_iia_winner_set(&one_seat, stv.as_ref(), 1), Ok(1.0));
    }

    #[test]
    fn winner_set_scores_five_candidates() {
        init_logs();
        let landslide = profile(&[("ABCDE", 51), ("EBACD", 34), ("DCEAB", 15)]);
        let split = profile(&[("ABCDE", 6), ("CDEAB", 4)]);
        for name in ["borda", "plurality", "stv"] {
            let e = engine(name, 5);
            assert_eq!(sigma_iia_winner_set(&landslide, e.as_ref(), 1), Ok(1.0));
            assert_eq!(sigma_um_winner_set(&landslide, e.as_ref(), 1), Ok(1.0));
            assert_close(sigma_um_winner_set(&split, e.as_ref(), 2).unwrap(), 0.705);
        }
        let expected = [("stv", 0.8), ("plurality", 0.8), ("borda", 1.0)];
        for (name, value) in expected {
            let score = sigma_iia_winner_set(&split, engine(name, 5).as_ref(), 2).unwrap();
            assert_close(score, value);
        }
    }

    #[test]
    fn removing_a_loser_hurts_less() {
        let split = profile(&[("ABCDE", 6), ("CDEAB", 4)]);
        for name in ["borda", "plurality", "stv"] {
            let e = engine(name, 5);
            let winners = e.run(&split, 2).unwrap().winner_set();
            let terms = sigma_iia_winner_set_terms(&split, e.as_ref(), 2).unwrap();
            let (won, lost): (Vec<&RemovalTerm>, Vec<&RemovalTerm>) =
                terms.iter().partition(|t| winners.contains(&t.removed[0]));
            let best_winner = won.iter().map(|t| t.value).fold(0.0, f64::max);
            assert!(lost.iter().all(|t| t.value >= best_winner));
        }
    }

    #[test]
    fn all_subsets() {
        let p = cyclic();
        let borda = engine("borda", 3);
        // With 3 candidates the subsets are the single candidates.
        assert_close(
            sigma_iia_all_subsets(&p, borda.as_ref(), 1).unwrap(),
            sigma_iia(&p, borda.as_ref(), 1).unwrap(),
        );
        let four = profile(&[("ABCD", 5), ("BACD", 3), ("DCAB", 2)]);
        assert_close(
            sigma_iia_all_subsets(&four, engine("stv", 4).as_ref(), 1).unwrap(),
            1.0 - 1.0 / 6.0,
        );
    }

    #[test]
    fn all_subsets_candidate_limit() {
        let names: Vec<String> = (0..17).map(|i| format!("C{:02}", i)).collect();
        let mut builder = ProfileBuilder::new();
        builder.add_ballot_simple(&names).unwrap();
        let p = builder.build().unwrap();
        let err = sigma_iia_all_subsets(&p, engine("borda", 17).as_ref(), 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn small_profiles() {
        let p = profile(&[("AB", 2), ("BA", 1)]);
        let borda = engine("borda", 2);
        assert_eq!(sigma_iia(&p, borda.as_ref(), 1), Ok(1.0));
        assert_eq!(sigma_iia_all_subsets(&p, borda.as_ref(), 2), Ok(1.0));
        assert_eq!(sigma_um(&p, borda.as_ref(), 1), Ok(1.0));
        assert_eq!(sigma_um_winner_set(&p, borda.as_ref(), 2), Ok(1.0));
        let single = profile(&[("A", 1)]);
        assert_eq!(sigma_iia(&single, borda.as_ref(), 1), Ok(1.0));
        assert_eq!(sigma_um(&single, borda.as_ref(), 1), Ok(1.0));
        assert_eq!(sigma_iia_winner_set(&single, borda.as_ref(), 1), Ok(1.0));
    }

    #[test]
    fn invalid_seats_are_reported() {
        let p = cyclic();
        for metric in Metric::ALL {
            let err = metric.compute(&p, engine("stv", 3).as_ref(), 0).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Configuration);
        }
    }

    #[test]
    fn metric_names() {
        for metric in Metric::ALL {
            assert_eq!(metric.to_string().parse::<Metric>(), Ok(metric));
        }
        assert!("sigma_XYZ".parse::<Metric>().is_err());
    }

    const NAMES: [&str; 4] = ["A", "B", "C", "D"];

    // Complete rankings, so that a single-seat STV count always finishes.
    fn arb_profile() -> impl Strategy<Value = Profile> {
        prop::collection::vec((Just(NAMES.to_vec()).prop_shuffle(), 1u64..5), 1..6).prop_map(
            |ballots| {
                let mut builder = ProfileBuilder::new();
                for (ranking, count) in ballots {
                    let groups: Vec<Vec<&str>> = ranking.iter().map(|c| vec![*c]).collect();
                    builder.add_ballot(&groups, count).unwrap();
                }
                builder.build().unwrap()
            },
        )
    }

    proptest! {
        #[test]
        fn scores_are_bounded(p in arb_profile(), rule in prop::sample::select(vec!["borda", "2-approval", "plurality", "stv"])) {
            let e = engine(rule, p.num_candidates());
            for metric in Metric::ALL {
                let score = metric.compute(&p, e.as_ref(), 1).unwrap();
                prop_assert!((0.0..=1.0 + 1e-12).contains(&score), "{} = {}", metric, score);
            }
        }

        #[test]
        fn sigma_iia_is_one_without_reordering(p in arb_profile()) {
            let e = engine("borda", p.num_candidates());
            let terms = sigma_iia_terms(&p, e.as_ref(), 1).unwrap();
            let score = sigma_iia(&p, e.as_ref(), 1).unwrap();
            prop_assert_eq!(score == 1.0, terms.iter().all(|t| t.value == 0.0));
        }
    }
}
