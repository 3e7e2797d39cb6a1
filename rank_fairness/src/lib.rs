/*!
Fairness scores for ranked voting rules.

A voting rule turns a [Profile] of ranked ballots into a ranking of the
candidates. This crate runs a rule on a profile and measures two properties of
the outcome:
- independence of irrelevant alternatives (σ_IIA): how much the ranking of the
  other candidates changes when a candidate is removed from the election,
- majoritarian alignment (σ_UM): how strongly the voters support each ranked
  pair in the order of the ranking.

The supported rules are Borda, k-approval, plurality and single transferable
vote (STV), see [RuleName].

```
use rank_fairness::builder::ProfileBuilder;
use rank_fairness::*;

let mut builder = ProfileBuilder::new();
builder.add_ballot(&[vec!["A"], vec!["B"], vec!["C"]], 5)?;
builder.add_ballot(&[vec!["B"], vec!["A"], vec!["C"]], 3)?;
builder.add_ballot(&[vec!["C"], vec!["A"], vec!["B"]], 2)?;
let profile = builder.build()?;

let rule = "stv".parse::<RuleName>()?;
let engine = build_voting_rule(profile.num_candidates(), &rule, TieBreakMode::Lexicographic)?;
let outcome = engine.run(&profile, 1)?;
assert_eq!(outcome.winners, vec![Candidate::new("A")]);
assert_eq!(Metric::SigmaUm.compute(&profile, engine.as_ref(), 1)?, 1.0);
# Ok::<(), FairnessError>(())
```

See the [manual] for the command line program.
*/

mod config;
mod tiebreak;

pub mod builder;
pub mod distance;
pub mod engine;
pub mod fairness;
pub mod manual;
pub mod profile;
pub mod scoring;
pub mod stv;

pub use crate::config::*;
pub use crate::engine::{build_voting_rule, VotingRuleEngine};
pub use crate::fairness::*;
pub use crate::profile::{Ballot, Profile};
