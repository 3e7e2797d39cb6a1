// Reader for the comma-separated rendering of BLT election files.
//
// 3,1
// 12,1,2,3,0
// 5,2=3,1,0
// 0
// "Candidate 1","Alice","Party A"
// "Candidate 2","Bob","Party B"
// "Candidate 3","Carol",""
// "Ward 7 by-election"

use std::collections::BTreeMap;

use crate::evaluate::{io_common::parse_count, *};

fn candidate_names(
    declared: &BTreeMap<usize, String>,
    num_candidates: usize,
) -> Vec<String> {
    (1..=num_candidates)
        .map(|idx| {
            declared
                .get(&idx)
                .cloned()
                .unwrap_or_else(|| format!("Candidate {}", idx))
        })
        .collect()
}

fn parse_ballot(
    cells: &[String],
    names: &[String],
    lineno: usize,
) -> RunResult<Option<ParsedBallot>> {
    let (count_cell, rest) = match cells.split_first() {
        Some(x) => x,
        None => return Ok(None),
    };
    let count = parse_count(count_cell, lineno)?;
    let mut choices: Vec<Vec<String>> = Vec::new();
    for cell in rest {
        let mut group: Vec<String> = Vec::new();
        for token in cell.split('=').map(|s| s.trim()).filter(|s| !s.is_empty()) {
            let index = match token.parse::<usize>() {
                Ok(x) => x,
                Err(_) => {
                    warn!(
                        "read_blt_csv: line {}: skipping unreadable choice {:?}",
                        lineno, token
                    );
                    continue;
                }
            };
            // 0 ends the ballot.
            if index == 0 {
                break;
            }
            let name = names
                .get(index - 1)
                .context(BltCandidateIndexSnafu { lineno, index })?;
            group.push(name.clone());
        }
        if cell.trim() == "0" {
            break;
        }
        if !group.is_empty() {
            choices.push(group);
        }
    }
    Ok(Some(ParsedBallot {
        id: Some(format!("line-{:08}", lineno)),
        count: Some(count),
        choices,
    }))
}

pub fn read_blt_csv(path: &str) -> RunResult<ParsedProfile> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let mut rows: Vec<(usize, Vec<String>)> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate() {
        let lineno = idx + 1;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        let cells: Vec<String> = line
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if !cells.is_empty() {
            rows.push((lineno, cells));
        }
    }

    let mut iter = rows.into_iter();
    let (_, header) = iter.next().context(BltHeaderSnafu { path })?;
    let (num_candidates, seats) = match header.as_slice() {
        [n, s, ..] => match (n.parse::<usize>(), s.parse::<u32>()) {
            (Ok(n), Ok(s)) => (n, s),
            _ => return BltHeaderSnafu { path }.fail(),
        },
        _ => return BltHeaderSnafu { path }.fail(),
    };

    // The candidate rows come after the ballots. They are needed to name the
    // candidates of the ballots.
    let mut ballot_rows: Vec<(usize, Vec<String>)> = Vec::new();
    let mut declared: BTreeMap<usize, String> = BTreeMap::new();
    let mut title: Option<String> = None;
    for (lineno, cells) in iter {
        if cells[0].starts_with("Candidate") {
            let idx = cells[0]
                .trim_start_matches("Candidate")
                .trim()
                .parse::<usize>()
                .unwrap_or(declared.len() + 1);
            let name = cells.get(1).cloned().unwrap_or_else(|| cells[0].clone());
            declared.insert(idx, name);
        } else if !declared.is_empty() {
            title = Some(cells.join(","));
        } else if cells.len() == 1 && cells[0] == "0" {
            // End of the ballots.
        } else {
            ballot_rows.push((lineno, cells));
        }
    }

    let names = candidate_names(&declared, num_candidates);
    let mut ballots: Vec<ParsedBallot> = Vec::new();
    for (lineno, cells) in ballot_rows {
        match parse_ballot(&cells, &names, lineno) {
            Ok(Some(pb)) => ballots.push(pb),
            Ok(None) => {}
            Err(e) => {
                warn!("read_blt_csv: line {}: skipping ballot: {}", lineno, e);
            }
        }
    }
    info!(
        "read_blt_csv: {} candidates, {} seats, {} ballots, title {:?}",
        num_candidates,
        seats,
        ballots.len(),
        title
    );
    Ok(ParsedProfile {
        title,
        candidates: Some(names),
        seats: Some(seats),
        ballots,
    })
}
