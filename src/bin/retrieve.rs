use clap::Parser;
use log::{info, warn};

use election_recon::args::RetrieveArgs;
use election_recon::recon::retriever::run_retrieval;

fn main() {
    let args = RetrieveArgs::parse();
    election_recon::init_logger(args.verbose);

    match run_retrieval(&args.sources, &args.data_dir) {
        Ok(summary) => {
            info!("{} documents saved", summary.saved.len());
            if !summary.failed.is_empty() {
                warn!("{} URLs could not be retrieved", summary.failed.len());
            }
        }
        Err(e) => {
            eprintln!("An error occured: {}", e);
            std::process::exit(1);
        }
    }
}
