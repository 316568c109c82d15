//! Print the masonry layout of an HTML file.

use log::error;
use masonry_cli::{Options, run};
use std::env;
use std::io::{self, Write as _};
use std::process::exit;
use tokio::runtime::Runtime;

fn main() {
    env_logger::init();
    let options = Options::from_args(env::args().skip(1));
    let result = options.and_then(|options| {
        let runtime = Runtime::new()?;
        runtime.block_on(run(&options))
    });
    match result {
        Ok(output) => {
            if let Err(err) = io::stdout().lock().write_all(output.as_bytes()) {
                error!("failed to write output: {err}");
                exit(1);
            }
        }
        Err(err) => {
            error!("{err:#}");
            exit(1);
        }
    }
}
