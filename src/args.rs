use clap::Parser;

/// This is a multi-winner ranked voting tabulation program using Tideman's
/// alternative method.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The ranking spreadsheet. The first column holds the voter
    /// names, the remaining header cells name the candidates, and each
    /// following row holds one voter's numeric rankings (blank for no
    /// ranking).
    #[clap(short, long, value_parser)]
    pub input: String,

    /// (default csv) The type of the input: csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// The number of winners the contest should produce. The contest may end
    /// with more winners when a tie cannot be broken.
    #[clap(short = 'w', long, value_parser, default_value_t = 1)]
    pub num_winners: u32,

    /// (file path prefix or empty) If specified, round-by-round spreadsheets
    /// will be written starting with this prefix: the 1v1 match votes, the
    /// per-round match summaries and the per-round instant-runoff columns.
    #[clap(short = 'p', long, value_parser)]
    pub output_prefix: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the
    /// contest will be written in JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing the outcome of a contest in
    /// JSON format. If provided, tidemancontest will check that the tabulated
    /// output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// If passed as an argument, ballot assignments are submitted in
    /// ascending ranking order instead of the source column order.
    #[clap(long, takes_value = false)]
    pub rank_order: bool,

    /// If passed as an argument, will turn on verbose logging to the standard
    /// output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
