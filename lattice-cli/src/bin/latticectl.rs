use structopt::StructOpt;

use lattice_cli::{logger, LatticeCtl};

#[tokio::main]
async fn main() {
    if let Err(err) = LatticeCtl::from_args().run().await {
        logger::error(&format!("{:#}", err));
        std::process::exit(1);
    }
}
