//! Spring simulation CLI - print the reference triangle's state log.
//!
//! Redirect stdout to `results.txt` to produce the movie input.

use std::io::{self, BufWriter, Write};

use triangle_movie::compute::{SpringSystem, format_record};

const STEPS: u64 = 100;

fn main() {
    env_logger::init();

    let mut system = SpringSystem::reference_triangle();
    let records = system.run(STEPS);
    log::info!("Simulated {} steps", STEPS);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let result = records
        .iter()
        .try_for_each(|record| writeln!(out, "{}", format_record(record)))
        .and_then(|()| out.flush());

    if let Err(e) = result {
        eprintln!("Error writing records: {}", e);
        std::process::exit(1);
    }
}
