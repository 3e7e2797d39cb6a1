//! The preference profile: weighted ballots with tied groups, and the
//! candidate removal operator.

use log::debug;
use snafu::ensure;
use std::collections::{BTreeSet, HashSet};

use crate::config::*;

/// One ranking cast by `weight` identical voters.
///
/// Each preference group holds the candidates tied at that rank. Ballots may be
/// truncated: candidates that do not appear are ranked below all the others.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Ballot {
    groups: Vec<BTreeSet<Candidate>>,
    weight: VoteCount,
}

impl Ballot {
    /// Creates a ballot from its preference groups, best group first.
    ///
    /// Fails if a group is empty, if a candidate appears more than once or if
    /// the weight is zero.
    pub fn new(groups: Vec<Vec<Candidate>>, weight: u64) -> Result<Ballot, FairnessError> {
        ensure!(weight > 0, ZeroWeightSnafu {});
        let mut seen: HashSet<Candidate> = HashSet::new();
        let mut res: Vec<BTreeSet<Candidate>> = Vec::with_capacity(groups.len());
        for group in groups {
            ensure!(!group.is_empty(), EmptyPreferenceGroupSnafu {});
            let mut g = BTreeSet::new();
            for c in group {
                if !seen.insert(c.clone()) {
                    return DuplicateCandidateSnafu { candidate: c }.fail();
                }
                g.insert(c);
            }
            res.push(g);
        }
        Ok(Ballot {
            groups: res,
            weight: VoteCount(weight),
        })
    }

    /// A strict ranking, one candidate per group.
    pub fn strict(ranking: &[Candidate], weight: u64) -> Result<Ballot, FairnessError> {
        Ballot::new(ranking.iter().map(|c| vec![c.clone()]).collect(), weight)
    }

    pub fn groups(&self) -> &[BTreeSet<Candidate>] {
        &self.groups
    }

    pub fn weight(&self) -> VoteCount {
        self.weight
    }

    /// True if no candidate is ranked. Such ballots still count as voters.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The number of ranked candidates, over all the groups.
    pub fn num_ranked(&self) -> usize {
        self.groups.iter().map(|g| g.len()).sum()
    }

    /// The index of the group that contains the candidate, if ranked.
    pub fn group_index(&self, candidate: &Candidate) -> Option<usize> {
        self.groups.iter().position(|g| g.contains(candidate))
    }

    pub fn candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.groups.iter().flat_map(|g| g.iter())
    }

    /// The candidates of the first group that still contains an active
    /// candidate, restricted to the active candidates.
    pub(crate) fn first_active_group(&self, active: &BTreeSet<Candidate>) -> Vec<&Candidate> {
        for g in self.groups.iter() {
            let members: Vec<&Candidate> = g.iter().filter(|c| active.contains(*c)).collect();
            if !members.is_empty() {
                return members;
            }
        }
        Vec::new()
    }

    fn without(&self, removed: &BTreeSet<Candidate>) -> Ballot {
        let groups = self
            .groups
            .iter()
            .map(|g| g.difference(removed).cloned().collect::<BTreeSet<Candidate>>())
            .filter(|g| !g.is_empty())
            .collect();
        Ballot {
            groups,
            weight: self.weight,
        }
    }
}

/// An immutable collection of ballots over an explicit set of candidates.
///
/// The candidate set may contain candidates that no ballot mentions. The
/// total weight of the ballots is always positive.
#[derive(PartialEq, Debug, Clone)]
pub struct Profile {
    ballots: Vec<Ballot>,
    candidates: BTreeSet<Candidate>,
    seats: u32,
    total_weight: VoteCount,
}

impl Profile {
    /// Creates a profile and checks its invariants.
    ///
    /// Every candidate of a ballot must be declared in `candidates`, the
    /// declared candidates must be distinct and the ballots must carry at least
    /// one voter.
    pub fn new(
        ballots: Vec<Ballot>,
        candidates: Vec<Candidate>,
        seats: u32,
    ) -> Result<Profile, FairnessError> {
        let mut cands: BTreeSet<Candidate> = BTreeSet::new();
        for c in candidates {
            if cands.contains(&c) {
                return DuplicateCandidateSnafu { candidate: c }.fail();
            }
            cands.insert(c);
        }
        for b in ballots.iter() {
            if let Some(c) = b.candidates().find(|c| !cands.contains(*c)) {
                return UnknownCandidateSnafu {
                    candidate: c.clone(),
                }
                .fail();
            }
        }
        let total_weight: VoteCount = ballots.iter().map(|b| b.weight).sum();
        ensure!(total_weight > VoteCount::EMPTY, EmptyProfileSnafu {});
        debug!(
            "Profile::new: {} ballots, {} candidates, {:?} voters",
            ballots.len(),
            cands.len(),
            total_weight
        );
        Ok(Profile {
            ballots,
            candidates: cands,
            seats,
            total_weight,
        })
    }

    pub fn ballots(&self) -> &[Ballot] {
        &self.ballots
    }

    pub fn candidates(&self) -> &BTreeSet<Candidate> {
        &self.candidates
    }

    pub fn num_candidates(&self) -> usize {
        self.candidates.len()
    }

    pub fn seats(&self) -> u32 {
        self.seats
    }

    /// The number of voters, summed over the ballots.
    pub fn total_weight(&self) -> VoteCount {
        self.total_weight
    }

    /// The same ballots with another number of seats.
    pub fn with_seats(&self, seats: u32) -> Profile {
        Profile {
            seats,
            ..self.clone()
        }
    }

    /// Returns the profile in which the given candidates never ran.
    ///
    /// The removed candidates disappear from the candidate set and from every
    /// ballot. Groups that become empty are dropped. Ballots that become empty
    /// are kept so that the number of voters does not change. The number of
    /// seats is unchanged.
    pub fn remove(&self, removed: &BTreeSet<Candidate>) -> Profile {
        Profile {
            ballots: self.ballots.iter().map(|b| b.without(removed)).collect(),
            candidates: self.candidates.difference(removed).cloned().collect(),
            seats: self.seats,
            total_weight: self.total_weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(name: &str) -> Candidate {
        Candidate::from(name)
    }

    fn cands(names: &[&str]) -> Vec<Candidate> {
        names.iter().map(|n| c(n)).collect()
    }

    fn ballot(groups: &[&[&str]], weight: u64) -> Ballot {
        Ballot::new(groups.iter().map(|g| cands(g)).collect(), weight).unwrap()
    }

    fn removed(names: &[&str]) -> BTreeSet<Candidate> {
        names.iter().map(|n| c(n)).collect()
    }

    #[test]
    fn ballot_invariants() {
        let dup = Ballot::new(vec![cands(&["A"]), cands(&["B", "A"])], 1);
        assert_eq!(dup, Err(FairnessError::DuplicateCandidate { candidate: c("A") }));
        let empty = Ballot::new(vec![cands(&["A"]), vec![]], 1);
        assert_eq!(empty, Err(FairnessError::EmptyPreferenceGroup {}));
        let zero = Ballot::new(vec![cands(&["A"])], 0);
        assert_eq!(zero.unwrap_err().kind(), ErrorKind::InvariantViolation);
    }

    #[test]
    fn profile_invariants() {
        let b = ballot(&[&["A"], &["D"]], 2);
        let unknown = Profile::new(vec![b.clone()], cands(&["A", "B"]), 1);
        assert_eq!(
            unknown,
            Err(FairnessError::UnknownCandidate { candidate: c("D") })
        );
        let dup = Profile::new(vec![b], cands(&["A", "D", "A"]), 1);
        assert!(dup.is_err());
        let no_voters = Profile::new(vec![], cands(&["A", "B"]), 1);
        assert_eq!(no_voters, Err(FairnessError::EmptyProfile {}));
    }

    #[test]
    fn remove_keeps_empty_ballots() {
        let p = Profile::new(
            vec![ballot(&[&["A"]], 3), ballot(&[&["B", "C"], &["A"]], 2)],
            cands(&["A", "B", "C"]),
            1,
        )
        .unwrap();
        let r = p.remove(&removed(&["A", "B"]));
        assert_eq!(r.total_weight(), VoteCount(5));
        assert_eq!(r.candidates(), &removed(&["C"]));
        assert!(r.ballots()[0].is_empty());
        assert_eq!(r.ballots()[1].groups(), &[removed(&["C"])]);
        // The original is untouched.
        assert_eq!(p.ballots()[1].num_ranked(), 3);
    }

    #[test]
    fn remove_composes() {
        let p = Profile::new(
            vec![
                ballot(&[&["A"], &["B", "C"], &["D"]], 4),
                ballot(&[&["D", "B"]], 1),
                ballot(&[&["C"], &["A"]], 2),
            ],
            cands(&["A", "B", "C", "D", "E"]),
            2,
        )
        .unwrap();
        let step = p.remove(&removed(&["A"])).remove(&removed(&["B"]));
        assert_eq!(step, p.remove(&removed(&["A", "B"])));
        assert_eq!(step.seats(), 2);
    }

    #[test]
    fn first_active_group_splits_ties() {
        let b = ballot(&[&["A"], &["B", "C", "D"]], 1);
        let active = removed(&["C", "D"]);
        assert_eq!(b.first_active_group(&active), vec![&c("C"), &c("D")]);
        assert!(b.first_active_group(&removed(&["E"])).is_empty());
    }
}
