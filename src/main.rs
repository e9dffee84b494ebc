use std::process::ExitCode;
use std::time::Instant;
use sunset_pipeline::prelude::*;

#[tokio::main]
async fn main() -> ExitCode {
    let Some(input) = std::env::args().nth(1) else {
        eprintln!("Usage: sunset_pipeline <input file path>");
        return ExitCode::FAILURE;
    };

    let config = PipelineConfig::default();
    if let Err(e) = LoggerConfig::from(&config.log).init() {
        eprintln!("Failed to initialize logger: {e}");
    }

    let started = Instant::now();
    let outcome = match Pipeline::from_config(&config) {
        Ok(pipeline) => run_file(&input, &config, &pipeline).await,
        Err(e) => Err(e),
    };
    if let Err(e) = outcome {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    println!("Pipeline executed in: {:?}", started.elapsed());
    println!("Application has stopped running");
    ExitCode::SUCCESS
}
