use clap::Parser;
use std::path::PathBuf;

/// Downloads the election result datasets listed in a source file.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct RetrieveArgs {
    /// (file path, default list_source.txt) The list of URLs to download, one per line.
    #[clap(short, long, value_parser, default_value = "list_source.txt")]
    pub sources: PathBuf,

    /// (directory, default data) Where the downloaded JSON files are written. It is created if needed.
    #[clap(short, long, value_parser, default_value = "data")]
    pub data_dir: PathBuf,

    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}

/// Joins the constituency metadata with the vote statistics and flags the constituencies
/// where the constituency-seat and party-list ballots disagree.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct ReconcileArgs {
    /// (directory, default data) The directory holding info_constituency.json and stats_cons.json.
    /// All the reports are written in the same directory.
    #[clap(short, long, value_parser, default_value = "data")]
    pub data_dir: PathBuf,

    /// (file path) A reference relation in JSON format. If provided, the program checks that
    /// the computed relation matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<PathBuf>,

    /// If passed as an argument, the charts are not drawn.
    #[clap(long, takes_value = false)]
    pub no_charts: bool,

    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
