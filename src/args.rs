use clap::Parser;

/// Measures how fair a voting rule is on a profile of ranked ballots.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON configuration that describes the profiles and the voting rule.
    /// The format is described in the documentation of the rank_fairness crate (module manual).
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference summary in JSON format. If provided, rankfair will check that the
    /// computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary will be written in JSON format to the given
    /// location. Setting this option overrides the output directory of the configuration.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) If specified, the profile to read. This replaces the profile sources
    /// of the configuration.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: json, csv or blt_csv.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default borda without configuration) The voting rule: borda, plurality, stv or k-approval (2-approval, ...).
    #[clap(long, value_parser)]
    pub rule: Option<String>,

    /// The number of seats to fill. Defaults to the configuration, then to the input file, then to 1.
    #[clap(long, value_parser)]
    pub seats: Option<u32>,

    /// (default lexicographic) How ties are broken: lexicographic, firstPlace or borda.
    #[clap(long, value_parser)]
    pub tiebreak: Option<String>,

    /// (list of comma-separated values) The metrics to compute: sigma_IIA, sigma_IIA_all_subsets,
    /// sigma_IIA_winner_set, sigma_UM, sigma_UM_winner_set.
    #[clap(long, value_parser, value_delimiter = ',')]
    pub metric: Option<Vec<String>>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
