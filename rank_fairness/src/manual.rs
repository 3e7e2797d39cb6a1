/*!

This is the long-form manual for `rank_fairness` and `rankfair`.

## Voting rules

* `borda` Each ballot gives `m-1` points to its first choice, `m-2` to the second, and so
  on down to 0, where `m` is the number of candidates.
* `k-approval` (for example `2-approval`) Each ballot gives one point to each of its first
  `k` choices. `k` must not exceed the number of candidates.
* `plurality` Each ballot gives one point to its first choice.
* `stv` Single transferable vote with the Droop quota `floor(voters / (seats + 1)) + 1`.
  Every round counts the first active choice of each ballot. The candidates that reach the quota
  are elected, otherwise the candidate with the lowest count is eliminated. Ballots move in full
  to their next active choice; surpluses are not transferred fractionally.

Candidates that a ballot ranks at the same level share the points of the positions they
occupy. Candidates left off a ballot receive nothing from it.

The outcome of a rule is a full ranking of the candidates. The winners are the first
`seats` candidates of this ranking. For STV, the ranking lists the elected candidates in
order of election, then the candidates still running when the seats were filled, then the
eliminated candidates from the last eliminated to the first.

### Tie breaks

* `lexicographic` (default) Tied candidates are ordered by name.
* `firstPlace` Tied candidates are ordered by the number of first choices they received,
  then by name.
* `borda` Tied candidates are ordered by their Borda score, then by name.

The same order picks the candidate that STV eliminates among the lowest counts.

## Metrics

* `sigma_IIA` Each candidate is removed in turn and the election is run again. The inversion
  distance between the new ranking and the original ranking of the remaining candidates is
  summed over the removals, and the score is `1 - total / (n * (n-1)(n-2)/2)`.
  A score of 1 means that no removal ever changed the order of the other candidates.
* `sigma_IIA_all_subsets` The same measure over every set of removed candidates that leaves
  at least two candidates, each distance normalized by the number of pairs that remain.
  It is limited to 16 candidates.
* `sigma_IIA_winner_set` For each removed candidate, the share of the original winners that
  are still elected. Removing a winner frees its seat.
* `sigma_UM` The smallest share of voters that prefers the higher candidate over the lower one,
  over all the pairs of the ranking. A share of one half or more gives a score of 1. Below,
  the score is `(2/π) asin(sqrt(2 m))`.
* `sigma_UM_winner_set` The same measure restricted to the pairs of a winner and a
  candidate that was not elected.

All the scores are between 0 and 1, and 1 is the fairest outcome.

## Input formats

The following formats are supported:
* `json` A profile in JSON
* `csv` Comma Separated Values, one ballot per row
* `blt_csv` The BLT election format, with commas between the fields

### json

```text
{
  "title": "Condorcet cycle",
  "candidates": ["A", "B", "C"],
  "seats": 1,
  "ballots": [
    { "ranking": [["A"], ["B"], ["C"]], "weight": 4 },
    { "ranking": [["B", "C"], ["A"]] }
  ]
}
```

Each entry of `ranking` is a preference level, best first. The names in the same level are
tied. `weight` (or `count`) is the number of voters that cast this ballot, 1 if omitted.
`title`, `candidates` and `seats` are optional.

### csv

Simple CSV reader. Each column (in order) is considered to be a rank. The name of the rank in
the header is not significant.

```text
count,choice 1,choice 2,choice 3
20,A,B,C
20,A,B=C,
```

A cell may contain several candidates separated by the tie delimiter (`=` by default), which
are then tied at that rank. Blank cells are skipped. The `count` column and the header row are
optional. See the [Configuration section](#configuration) on controlling the optional rows
and columns.

### blt_csv

```text
4,1
5,1,2,3,4,0
3,2=1,3,4,0
0
"Candidate 1","Alice"
"Candidate 2","Bob"
"Candidate 3","Carol"
"Candidate 4","Dan"
"Four candidates by-election"
```

The first line holds the number of candidates and the number of seats. Each ballot line holds
the number of voters, then the 1-based indices of the candidates in order, and ends with 0.
Tied candidates are joined by `=`. A line with a single 0 ends the ballots. The candidate
lines and the title follow. Ballot lines that cannot be read are skipped with a warning.

## Configuration

The program accepts a configuration file in JSON:

```text
{
  "outputSettings": { "contestName": "ward_7", "outputDirectory": "output" },
  "profileSources": [
    { "provider": "csv", "filePath": "ward_7.csv", "countColumnIndex": "A",
      "firstVoteColumnIndex": 2, "firstVoteRowIndex": 2, "tieDelimiter": "=" }
  ],
  "candidates": [ { "name": "A" }, { "name": "B" }, { "name": "C", "excluded": true } ],
  "rules": {
    "votingRule": "stv",
    "numberOfSeats": 2,
    "tiebreakMode": "lexicographic",
    "metrics": ["sigma_IIA", "sigma_UM"]
  }
}
```

OutputSettings:
 - `contestName` (string): the name of the contest, reported in the summary.
 - `outputDirectory` (string, optional): the summary is written to
   `<outputDirectory>/<contestName>_summary.json`, relative to the configuration file.
   Without it, the summary is printed.

ProfileSource:
 - `provider` (string): one of the input formats.
 - `filePath` (string): relative to the configuration file.
 - `countColumnIndex` (string or number, optional): the location of the column that
   indicates the counts. If not provided, every ballot is cast by one voter.
 - `firstVoteColumnIndex`, `firstVoteRowIndex` (string or number, optional): the first
   column and the first row with choices.
 - `tieDelimiter` (string, optional): separates tied candidates in a cell.

The indices are 1-based numbers, or letters as in spreadsheets (`A` is the first column).

Candidates (optional): the declared candidates. Excluded candidates are removed from the profile
before the election. Without this list, the candidates are the ones declared in the input
file, or else the ones found on the ballots.

Rules:
 - `votingRule` (string): one of the voting rules.
 - `numberOfSeats` (number, optional): defaults to the input file, then to 1.
 - `tiebreakMode` (string, optional): one of the tie breaks.
 - `metrics` (array of strings, optional): defaults to every metric except
   `sigma_IIA_all_subsets`.

## Command line

```bash
rankfair --config ward_7_config.json --reference ward_7_expected_summary.json
rankfair -i ballots.csv --rule 2-approval --seats 2 --metric sigma_IIA,sigma_UM
```

The options `--input`, `--input-type`, `--rule`, `--seats`, `--tiebreak` and `--metric`
override the configuration. With `--reference`, the program fails if the computed summary
differs from the reference summary.

 */
