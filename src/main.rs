//! Triangle Movie CLI - render `results.txt` into `movie.mp4`.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

use triangle_movie::MovieConfig;

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    let config = match args.get(1).map(String::as_str) {
        None => MovieConfig::default(),
        Some("--example") => {
            print_example_config();
            return;
        }
        Some(path) if args.len() == 2 && !path.starts_with('-') => {
            MovieConfig::from_json_file(PathBuf::from(path)).unwrap_or_else(|e| {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            })
        }
        Some(_) => {
            eprintln!("Usage: {} [config.json]", args[0]);
            eprintln!();
            eprintln!("Render the triangle log into a video.");
            eprintln!();
            eprintln!("Without arguments, reads results.txt and writes movie.mp4.");
            eprintln!("Print the default configuration with --example.");
            std::process::exit(1);
        }
    };

    let start = Instant::now();
    match triangle_movie::run(&config) {
        Ok(stats) => {
            println!(
                "{}: {} ({:.2}s)",
                config.output.display(),
                stats,
                start.elapsed().as_secs_f32()
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = cause.source();
            }
            std::process::exit(1);
        }
    }
}

fn print_example_config() {
    match serde_json::to_string_pretty(&MovieConfig::default()) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing config: {}", e);
            std::process::exit(1);
        }
    }
}
