// Primitives for reading CSV files.

use std::fs::File;

use crate::evaluate::{
    io_common::{parse_count, simplify_file_name, split_ties},
    *,
};

/// Reads one ballot per row.
///
/// Each cell from the first choice column on is one rank. A cell with the
/// tie delimiter holds several candidates tied at that rank.
pub fn read_csv_ranking(path: &str, cfs: &ProfileSource) -> RunResult<ParsedProfile> {
    let default_id = make_default_id(path);

    let choices_start_col = cfs.first_vote_column_index()?;
    let count_idx_o = cfs.count_column_index_int()?;
    let tie_delimiter = cfs.tie_delimiter();

    let mut res: Vec<ParsedBallot> = Vec::new();
    let (records, row_offset) = get_records(path, cfs)?;

    for (idx, line_r) in records.enumerate() {
        let lineno = idx + row_offset + 1;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;

        let count: u64 = match count_idx_o {
            Some(count_idx) => {
                let cell = line
                    .get(count_idx)
                    .context(CsvLineTooShortSnafu { lineno })?;
                parse_count(cell, lineno)?
            }
            None => 1,
        };

        let choices_parsed: Vec<Vec<String>> = line
            .iter()
            .enumerate()
            .skip(choices_start_col)
            .filter(|(col, _)| Some(*col) != count_idx_o)
            .map(|(_, s)| split_ties(s, &tie_delimiter))
            .filter(|group| !group.is_empty())
            .collect();
        debug!(
            "read_csv_ranking: lineno: {:?} row: {:?}",
            lineno, &choices_parsed
        );

        res.push(ParsedBallot {
            id: Some(default_id(lineno)),
            count: Some(count),
            choices: choices_parsed,
        });
    }
    Ok(ParsedProfile {
        ballots: res,
        ..ParsedProfile::default()
    })
}

fn get_records(
    path: &str,
    cfs: &ProfileSource,
) -> RunResult<(csv::StringRecordsIntoIter<File>, usize)> {
    let first_row = cfs.first_vote_row_index()?;
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut records = rdr.into_records();
    for _ in 0..first_row {
        _ = records.next();
    }
    Ok((records, first_row))
}

fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_ranking_with_counts_and_ties() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/csv_ties/csv_ties.csv");
        let mut source = ProfileSource::new("csv", path);
        source.count_column_index = Some(serde_json::json!(1));
        source._first_vote_column_index = Some(serde_json::json!(2));
        source._first_vote_row_index = Some(serde_json::json!(2));
        let parsed = read_csv_ranking(path, &source).unwrap();
        assert_eq!(parsed.ballots.len(), 3);
        let first = &parsed.ballots[0];
        assert_eq!(first.count, Some(4));
        assert_eq!(
            first.choices,
            vec![vec!["A".to_string()], vec!["B".to_string(), "C".to_string()]]
        );
        assert_eq!(first.id.as_deref(), Some("csv_ties.csv-00000002"));
        // A row with only blank choices is an empty ballot.
        assert!(parsed.ballots[2].choices.is_empty());
        assert_eq!(parsed.ballots[2].count, Some(1));
    }
}
