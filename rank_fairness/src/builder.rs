pub use crate::config::*;
use crate::profile::{Ballot, Profile};

/// A builder for assembling a profile from plain strings.
///
/// The candidates may be declared upfront. Otherwise, the candidate set is
/// the set of all the names seen in the ballots.
///
/// ```
/// pub use rank_fairness::builder::ProfileBuilder;
/// # use rank_fairness::FairnessError;
///
/// let mut builder = ProfileBuilder::new()
///     .candidates(&["Anna", "Bob", "Clara"])
///     .seats(1);
///
/// builder.add_ballot_simple(&["Anna", "Clara", ""])?;
/// builder.add_ballot(&[vec!["Bob", "Clara"], vec!["Anna"]], 3)?;
///
/// let profile = builder.build()?;
/// assert_eq!(profile.total_weight().0, 4);
/// # Ok::<(), FairnessError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProfileBuilder {
    pub(crate) _candidates: Option<Vec<Candidate>>,
    pub(crate) _seats: u32,
    pub(crate) _ballots: Vec<Ballot>,
}

impl ProfileBuilder {
    pub fn new() -> ProfileBuilder {
        ProfileBuilder {
            _candidates: None,
            _seats: 1,
            _ballots: Vec::new(),
        }
    }

    pub fn candidates<S: AsRef<str>>(self, cands: &[S]) -> ProfileBuilder {
        ProfileBuilder {
            _candidates: Some(cands.iter().map(|s| Candidate::from(s.as_ref())).collect()),
            ..self
        }
    }

    pub fn seats(self, seats: u32) -> ProfileBuilder {
        ProfileBuilder {
            _seats: seats,
            ..self
        }
    }

    /// Adds a single voter with a strict ranking.
    ///
    /// Empty names are blank ranks and are skipped.
    pub fn add_ballot_simple<S: AsRef<str>>(&mut self, ranking: &[S]) -> Result<(), FairnessError> {
        let groups: Vec<Vec<&str>> = ranking.iter().map(|s| vec![s.as_ref()]).collect();
        self.add_ballot(&groups, 1)
    }

    /// Adds a ballot with tied groups, cast by `count` voters.
    ///
    /// groups: the preference groups, best first. Empty names are skipped, and
    /// a group with only empty names is a blank rank.
    pub fn add_ballot<S: AsRef<str>>(
        &mut self,
        groups: &[Vec<S>],
        count: u64,
    ) -> Result<(), FairnessError> {
        let choices: Vec<Vec<Candidate>> = groups
            .iter()
            .map(|g| {
                g.iter()
                    .map(|s| s.as_ref().trim())
                    .filter(|s| !s.is_empty())
                    .map(Candidate::from)
                    .collect::<Vec<Candidate>>()
            })
            .filter(|g| !g.is_empty())
            .collect();
        let ballot = Ballot::new(choices, count)?;
        self.add_parsed_ballot(ballot);
        Ok(())
    }

    pub fn add_parsed_ballot(&mut self, ballot: Ballot) {
        self._ballots.push(ballot);
    }

    pub fn build(self) -> Result<Profile, FairnessError> {
        let candidates = match self._candidates {
            Some(cands) => cands,
            None => {
                let mut seen: Vec<Candidate> = self
                    ._ballots
                    .iter()
                    .flat_map(|b| b.candidates().cloned())
                    .collect();
                seen.sort();
                seen.dedup();
                seen
            }
        };
        Profile::new(self._ballots, candidates, self._seats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_candidates() {
        let mut builder = ProfileBuilder::new().seats(2);
        builder.add_ballot_simple(&["B", "", "A"]).unwrap();
        builder.add_ballot(&[vec!["C", " "], vec!["A"]], 2).unwrap();
        let p = builder.build().unwrap();
        let names: Vec<&str> = p.candidates().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(p.seats(), 2);
        assert_eq!(p.ballots()[0].num_ranked(), 2);
    }

    #[test]
    fn rejects_undeclared_candidates() {
        let mut builder = ProfileBuilder::new().candidates(&["A", "B"]);
        builder.add_ballot_simple(&["A", "Z"]).unwrap();
        assert_eq!(
            builder.build().unwrap_err().kind(),
            ErrorKind::InvariantViolation
        );
    }
}
