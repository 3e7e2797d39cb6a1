use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::config::*;
use crate::profile::Profile;
use crate::scoring::{borda_vector, first_place_scores, positional_scores};

/// Orders candidates that a rule could not separate.
///
/// The secondary scores are computed once, on the profile given to the rule.
pub(crate) struct TieBreaker {
    mode: TieBreakMode,
    secondary: BTreeMap<Candidate, f64>,
}

impl TieBreaker {
    pub(crate) fn new(profile: &Profile, mode: TieBreakMode) -> TieBreaker {
        let secondary = match mode {
            TieBreakMode::Lexicographic => BTreeMap::new(),
            TieBreakMode::FirstPlace => first_place_scores(profile),
            TieBreakMode::Borda => {
                positional_scores(profile, &borda_vector(profile.num_candidates()))
            }
        };
        TieBreaker { mode, secondary }
    }

    fn secondary(&self, c: &Candidate) -> f64 {
        self.secondary.get(c).copied().unwrap_or(0.0)
    }

    /// `Less` if `a` goes before `b` when both have the same primary score.
    pub(crate) fn compare(&self, a: &Candidate, b: &Candidate) -> Ordering {
        match self.mode {
            TieBreakMode::Lexicographic => a.cmp(b),
            TieBreakMode::FirstPlace | TieBreakMode::Borda => self
                .secondary(b)
                .total_cmp(&self.secondary(a))
                .then_with(|| a.cmp(b)),
        }
    }

    /// All the candidates of the map, highest score first.
    pub(crate) fn rank_by(&self, primary: &BTreeMap<Candidate, f64>) -> Vec<Candidate> {
        let mut ranking: Vec<Candidate> = primary.keys().cloned().collect();
        ranking.sort_by(|a, b| {
            let sa = primary.get(a).copied().unwrap_or(0.0);
            let sb = primary.get(b).copied().unwrap_or(0.0);
            sb.total_cmp(&sa).then_with(|| self.compare(a, b))
        });
        ranking
    }

    /// Picks the candidate to eliminate among candidates with the same lowest
    /// tally.
    ///
    /// With the lexicographic policy the smallest identifier goes first. The
    /// other policies eliminate the lowest secondary score, and then the
    /// smallest identifier.
    pub(crate) fn elimination_pick(&self, tied: &[Candidate]) -> Option<Candidate> {
        tied.iter()
            .min_by(|a, b| match self.mode {
                TieBreakMode::Lexicographic => a.cmp(b),
                TieBreakMode::FirstPlace | TieBreakMode::Borda => self
                    .secondary(a)
                    .total_cmp(&self.secondary(b))
                    .then_with(|| a.cmp(b)),
            })
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ProfileBuilder;

    #[test]
    fn borda_secondary_order() {
        let mut builder = ProfileBuilder::new();
        builder.add_ballot_simple(&["C", "B", "A"]).unwrap();
        builder.add_ballot_simple(&["B", "C", "A"]).unwrap();
        builder.add_ballot_simple(&["B", "A", "C"]).unwrap();
        let p = builder.build().unwrap();
        let flat: BTreeMap<Candidate, f64> =
            p.candidates().iter().map(|c| (c.clone(), 1.0)).collect();

        let lexi = TieBreaker::new(&p, TieBreakMode::Lexicographic);
        let names: Vec<String> = lexi.rank_by(&flat).iter().map(|c| c.to_string()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);

        let borda = TieBreaker::new(&p, TieBreakMode::Borda);
        let names: Vec<String> = borda.rank_by(&flat).iter().map(|c| c.to_string()).collect();
        assert_eq!(names, vec!["B", "C", "A"]);

        let tied = vec![Candidate::from("B"), Candidate::from("A")];
        assert_eq!(lexi.elimination_pick(&tied), Some(Candidate::from("A")));
        let all: Vec<Candidate> = p.candidates().iter().cloned().collect();
        assert_eq!(borda.elimination_pick(&all), Some(Candidate::from("A")));
        assert_eq!(borda.elimination_pick(&[]), None);
    }
}
