//! Distances between rankings, and pairwise support between candidates.

use snafu::ensure;
use std::collections::{BTreeMap, HashMap};

use crate::config::*;
use crate::profile::{Ballot, Profile};

/// The number of candidate pairs that the two rankings order differently
/// (Kendall tau distance).
///
/// Both rankings must contain the same candidates, each exactly once.
///
/// ```
/// # use rank_fairness::{Candidate, distance::inversion_distance};
/// let r1: Vec<Candidate> = ["A", "B", "C"].iter().map(|s| Candidate::from(*s)).collect();
/// let r2: Vec<Candidate> = ["C", "A", "B"].iter().map(|s| Candidate::from(*s)).collect();
/// assert_eq!(inversion_distance(&r1, &r2), Ok(2));
/// ```
pub fn inversion_distance(left: &[Candidate], right: &[Candidate]) -> Result<u64, FairnessError> {
    let positions: HashMap<&Candidate, usize> =
        right.iter().enumerate().map(|(idx, c)| (c, idx)).collect();
    let mismatch = || RankingMismatchSnafu {
        left: left.to_vec(),
        right: right.to_vec(),
    };
    ensure!(
        left.len() == right.len() && positions.len() == right.len(),
        mismatch()
    );
    let mut seen = vec![false; right.len()];
    let mut perm: Vec<usize> = Vec::with_capacity(left.len());
    for c in left {
        match positions.get(c) {
            Some(&p) if !seen[p] => {
                seen[p] = true;
                perm.push(p);
            }
            _ => return mismatch().fail(),
        }
    }
    let mut inversions: u64 = 0;
    for (i, pi) in perm.iter().enumerate() {
        inversions += perm[i + 1..].iter().filter(|pj| *pj < pi).count() as u64;
    }
    Ok(inversions)
}

// Support for `a` over `b` on one ballot, counted in half voters.
fn half_votes(ballot: &Ballot, a: Option<usize>, b: Option<usize>) -> u64 {
    let w = ballot.weight().0;
    match (a, b) {
        (Some(x), Some(y)) if x < y => 2 * w,
        (Some(x), Some(y)) if x == y => w,
        (Some(_), Some(_)) => 0,
        (Some(_), None) => 2 * w,
        (None, Some(_)) => 0,
        (None, None) => w,
    }
}

/// The share of the voters that prefer `a` to `b`.
///
/// A voter that ranks `a` above `b` counts fully. A voter that puts them in
/// the same group, or ranks neither, counts for half. A ranked candidate is
/// preferred to an unranked one.
pub fn pairwise_alignment(
    profile: &Profile,
    a: &Candidate,
    b: &Candidate,
) -> Result<f64, FairnessError> {
    for c in [a, b] {
        ensure!(
            profile.candidates().contains(c),
            UnknownCandidateSnafu { candidate: c.clone() }
        );
    }
    let total: u64 = profile
        .ballots()
        .iter()
        .map(|ballot| half_votes(ballot, ballot.group_index(a), ballot.group_index(b)))
        .sum();
    Ok(total as f64 / (2.0 * profile.total_weight().as_f64()))
}

/// The pairwise alignment of every ordered pair of candidates, computed in a
/// single pass over the ballots.
#[derive(Debug, Clone)]
pub struct SupportMatrix {
    index: BTreeMap<Candidate, usize>,
    // Row major, in half voters: half_votes[i * n + j] supports i over j.
    half_votes: Vec<u64>,
    total_weight: VoteCount,
}

impl SupportMatrix {
    pub fn new(profile: &Profile) -> SupportMatrix {
        let index: BTreeMap<Candidate, usize> = profile
            .candidates()
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.clone(), idx))
            .collect();
        let n = index.len();
        let mut half: Vec<u64> = vec![0; n * n];
        let mut positions: Vec<Option<usize>> = vec![None; n];
        for ballot in profile.ballots() {
            positions.iter_mut().for_each(|p| *p = None);
            for (group_idx, group) in ballot.groups().iter().enumerate() {
                for c in group {
                    if let Some(&idx) = index.get(c) {
                        positions[idx] = Some(group_idx);
                    }
                }
            }
            for i in 0..n {
                for j in 0..n {
                    if i != j {
                        half[i * n + j] += half_votes(ballot, positions[i], positions[j]);
                    }
                }
            }
        }
        SupportMatrix {
            index,
            half_votes: half,
            total_weight: profile.total_weight(),
        }
    }

    /// The share of the voters that prefer `a` to `b`.
    pub fn support(&self, a: &Candidate, b: &Candidate) -> Result<f64, FairnessError> {
        let i = self.position(a)?;
        let j = self.position(b)?;
        if i == j {
            return Ok(0.5);
        }
        let n = self.index.len();
        Ok(self.half_votes[i * n + j] as f64 / (2.0 * self.total_weight.as_f64()))
    }

    fn position(&self, c: &Candidate) -> Result<usize, FairnessError> {
        match self.index.get(c) {
            Some(idx) => Ok(*idx),
            None => UnknownCandidateSnafu { candidate: c.clone() }.fail(),
        }
    }
}
