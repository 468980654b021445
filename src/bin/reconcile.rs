use clap::Parser;
use log::info;

use election_recon::args::ReconcileArgs;
use election_recon::recon::{run_reconciliation, ReconcileOptions};

fn main() {
    let args = ReconcileArgs::parse();
    election_recon::init_logger(args.verbose);

    let opts = ReconcileOptions {
        data_dir: args.data_dir,
        reference: args.reference,
        draw_charts: !args.no_charts,
    };
    match run_reconciliation(&opts) {
        Ok(summary) => info!("Reconciliation done: {:?}", summary),
        Err(e) => {
            eprintln!("An error occured: {}", e);
            std::process::exit(1);
        }
    }
}
