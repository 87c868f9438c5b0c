mod effects;
mod render;
mod session;
mod viewport;

use std::path::PathBuf;
use std::process::ExitCode;

use pipeline_logging::{pipeline_error, LogDestination};

fn main() -> ExitCode {
    pipeline_logging::initialize(LogDestination::File);

    let mut args = std::env::args().skip(1);
    let Some(listing_url) = args.next() else {
        eprintln!("usage: darkroom_app <listing-url> [output-dir]");
        return ExitCode::from(2);
    };
    let output_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("filtered"));

    match session::run(&listing_url, &output_dir) {
        Ok(summary) => {
            println!(
                "{} photos: {} filtered, {} failed",
                summary.photo_count, summary.filtered, summary.failed
            );
            for path in &summary.exported {
                println!("exported {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            pipeline_error!("session failed: {err}");
            eprintln!("darkroom: {err}");
            ExitCode::FAILURE
        }
    }
}
