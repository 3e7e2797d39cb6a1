//! Single transferable vote, without fractional surplus transfers.
//!
//! Each round counts the first active choice of every ballot. The candidates
//! that reach the Droop quota are elected. If nobody does, the candidate with
//! the lowest tally is eliminated. Elected and eliminated candidates leave the
//! count, and their ballots then count in full for their next active choice.

use log::{debug, info};
use snafu::{ensure, OptionExt};
use std::collections::{BTreeMap, BTreeSet};

use crate::config::*;
use crate::engine::{check_seats, VotingRuleEngine};
use crate::profile::Profile;
use crate::tiebreak::TieBreaker;

#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct StvEngine {
    tiebreak: TieBreakMode,
}

impl StvEngine {
    pub fn new(tiebreak: TieBreakMode) -> StvEngine {
        StvEngine { tiebreak }
    }
}

/// The Droop quota: `floor(voters / (seats + 1)) + 1`.
pub fn droop_quota(total_weight: VoteCount, seats: u32) -> VoteCount {
    VoteCount(total_weight.0 / (seats as u64 + 1) + 1)
}

/// First-choice support of each active candidate.
///
/// A ballot supports the active candidates of its first group that contains
/// any, split equally between them.
fn first_choice_tally(profile: &Profile, active: &BTreeSet<Candidate>) -> BTreeMap<Candidate, f64> {
    let mut tally: BTreeMap<Candidate, f64> = active.iter().map(|c| (c.clone(), 0.0)).collect();
    for ballot in profile.ballots() {
        let group = ballot.first_active_group(active);
        if group.is_empty() {
            continue;
        }
        let share = ballot.weight().as_f64() / group.len() as f64;
        for c in group {
            if let Some(t) = tally.get_mut(c) {
                *t += share;
            }
        }
    }
    tally
}

impl VotingRuleEngine for StvEngine {
    fn name(&self) -> String {
        "stv".to_string()
    }

    fn tiebreak_mode(&self) -> TieBreakMode {
        self.tiebreak
    }

    fn run(&self, profile: &Profile, seats: u32) -> Result<ElectionOutcome, FairnessError> {
        check_seats(seats, profile.num_candidates())?;
        let quota = droop_quota(profile.total_weight(), seats);
        let tiebreak = TieBreaker::new(profile, self.tiebreak);
        info!(
            "run: stv: {} candidates, {} seats, quota {:?}",
            profile.num_candidates(),
            seats,
            quota
        );

        let mut active: BTreeSet<Candidate> = profile.candidates().clone();
        let mut elected: Vec<Candidate> = Vec::new();
        let mut eliminated: Vec<Candidate> = Vec::new();
        let mut round_stats: Vec<RoundStats> = Vec::new();

        while elected.len() < seats as usize {
            ensure!(
                !active.is_empty(),
                StvExhaustedSnafu {
                    elected: elected.len(),
                    seats
                }
            );
            let round = round_stats.len() as u32 + 1;
            let tally = first_choice_tally(profile, &active);
            let ordered = tiebreak.rank_by(&tally);
            debug!("run: round {}: tally {:?}", round, tally);

            let open_seats = seats as usize - elected.len();
            let reaching: Vec<Candidate> = ordered
                .iter()
                .filter(|c| tally.get(*c).copied().unwrap_or(0.0) >= quota.as_f64())
                .take(open_seats)
                .cloned()
                .collect();

            let mut stats = RoundStats {
                round,
                tally: ordered
                    .iter()
                    .map(|c| (c.clone(), tally.get(c).copied().unwrap_or(0.0)))
                    .collect(),
                elected: Vec::new(),
                eliminated: None,
            };
            if reaching.is_empty() {
                let lowest_tally = tally.values().copied().fold(f64::INFINITY, f64::min);
                let lowest: Vec<Candidate> = tally
                    .iter()
                    .filter(|(_, t)| **t <= lowest_tally)
                    .map(|(c, _)| c.clone())
                    .collect();
                let loser = tiebreak.elimination_pick(&lowest).context(StvExhaustedSnafu {
                    elected: elected.len(),
                    seats,
                })?;
                debug!("run: round {}: eliminating {}", round, loser);
                active.remove(&loser);
                eliminated.push(loser.clone());
                stats.eliminated = Some(loser);
            } else {
                for c in reaching {
                    debug!("run: round {}: electing {}", round, c);
                    active.remove(&c);
                    elected.push(c.clone());
                    stats.elected.push(c);
                }
            }
            round_stats.push(stats);
        }

        // Candidates still running when the seats were filled, by their support
        // once the winners are out of the count.
        let remaining = tiebreak.rank_by(&first_choice_tally(profile, &active));
        let mut ranking = elected.clone();
        ranking.extend(remaining);
        ranking.extend(eliminated.into_iter().rev());
        info!("run: stv: elected {:?}, ranking {:?}", elected, ranking);

        Ok(ElectionOutcome {
            ranking,
            winners: elected,
            scores: Vec::new(),
            quota: Some(quota.0),
            round_stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ProfileBuilder;

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn names(ranking: &[Candidate]) -> Vec<&str> {
        ranking.iter().map(|c| c.name()).collect()
    }

    fn profile(ballots: &[(&[&str], u64)]) -> Profile {
        let mut builder = ProfileBuilder::new();
        for (ranking, count) in ballots {
            let groups: Vec<Vec<&str>> = ranking.iter().map(|c| vec![*c]).collect();
            builder.add_ballot(&groups, *count).unwrap();
        }
        builder.build().unwrap()
    }

    #[test]
    fn quota() {
        assert_eq!(droop_quota(VoteCount(100), 1), VoteCount(51));
        assert_eq!(droop_quota(VoteCount(10), 2), VoteCount(4));
        assert_eq!(droop_quota(VoteCount(9), 2), VoteCount(4));
    }

    #[test]
    fn majority_winner_then_remaining() {
        init_logs();
        let p = profile(&[
            (&["A", "B", "C"], 51),
            (&["C", "B", "A"], 34),
            (&["B", "A", "C"], 15),
        ]);
        let out = StvEngine::new(TieBreakMode::Lexicographic).run(&p, 1).unwrap();
        assert_eq!(out.quota, Some(51));
        assert_eq!(out.round_stats.len(), 1);
        assert_eq!(names(&out.round_stats[0].elected), vec!["A"]);
        assert_eq!(names(&out.winners), vec!["A"]);
        // With A out of the count, B has 51 + 15 votes and C has 34.
        assert_eq!(names(&out.ranking), vec!["A", "B", "C"]);
    }

    #[test]
    fn eliminations_go_to_the_bottom() {
        init_logs();
        let p = profile(&[
            (&["A", "B", "C", "D"], 5),
            (&["B", "A", "C", "D"], 3),
            (&["D", "C", "A", "B"], 2),
        ]);
        let out = StvEngine::new(TieBreakMode::Lexicographic).run(&p, 1).unwrap();
        // Quota 6: C (0 votes) then D (2 votes) are eliminated, and the D
        // ballots make A reach the quota.
        let rounds: Vec<Option<&str>> = out
            .round_stats
            .iter()
            .map(|r| r.eliminated.as_ref().map(|c| c.name()))
            .collect();
        assert_eq!(rounds, vec![Some("C"), Some("D"), None]);
        assert_eq!(names(&out.ranking), vec!["A", "B", "D", "C"]);
    }

    #[test]
    fn batch_election_respects_open_seats() {
        let p = profile(&[(&["A", "B", "C"], 6), (&["C", "A", "B"], 4)]);
        let out = StvEngine::new(TieBreakMode::Lexicographic).run(&p, 2).unwrap();
        // Quota 4: A and C are elected together in the first round.
        assert_eq!(out.round_stats.len(), 1);
        assert_eq!(names(&out.winners), vec!["A", "C"]);
        assert_eq!(names(&out.ranking), vec!["A", "C", "B"]);

        let one = StvEngine::new(TieBreakMode::Lexicographic).run(&p, 1).unwrap();
        assert_eq!(names(&one.winners), vec!["A"]);
    }

    #[test]
    fn tied_first_groups_share_the_vote() {
        let mut builder = ProfileBuilder::new();
        builder.add_ballot(&[vec!["A", "B"], vec!["C"]], 4).unwrap();
        builder.add_ballot(&[vec!["C"]], 3).unwrap();
        let p = builder.build().unwrap();
        let out = StvEngine::new(TieBreakMode::Lexicographic).run(&p, 1).unwrap();
        // Quota 4: A and B get 2 each, C gets 3. A is eliminated on the tie
        // with B, and then B reaches the quota.
        assert_eq!(out.round_stats[0].eliminated, Some(Candidate::from("A")));
        assert_eq!(names(&out.winners), vec!["B"]);
        assert_eq!(names(&out.ranking), vec!["B", "C", "A"]);
    }

    #[test]
    fn runs_out_of_candidates() {
        // Only 2 of the 9 voters rank anybody: nobody reaches the quota of 5.
        let mut builder = ProfileBuilder::new().candidates(&["A", "B"]);
        builder.add_ballot_simple(&["A"]).unwrap();
        builder.add_ballot_simple(&["B"]).unwrap();
        builder.add_ballot_simple::<&str>(&[]).unwrap();
        builder.add_ballot(&[Vec::<&str>::new()], 6).unwrap();
        let p = builder.build().unwrap();
        let err = StvEngine::new(TieBreakMode::Lexicographic).run(&p, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
    }

    #[test]
    fn invalid_seats() {
        let p = profile(&[(&["A", "B"], 1)]);
        let err = StvEngine::default().run(&p, 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
