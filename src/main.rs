use anyhow::Context;
use clap::Parser;
use clap::error::ErrorKind;
use pm25_forecast::cli::{Args, usage_error_message};
use pm25_forecast::logging::setup_logging;
use pm25_forecast::{ForecastOutput, Result, pipeline};
use std::io::Write;
use std::process;

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(error) => match error.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => error.exit(),
            _ => finish(ForecastOutput::failure(usage_error_message(&error))),
        },
    };

    if let Err(error) = setup_logging(args.get_log_level()) {
        eprintln!("Warning: {}", error);
    }

    let output = match run(&args) {
        Ok(output) => output,
        Err(error) => {
            if error.is_argument_error() {
                tracing::warn!("{}", error);
            } else {
                tracing::error!("{}", error);
            }
            ForecastOutput::failure(error.to_string())
        }
    };

    finish(output);
}

fn run(args: &Args) -> Result<ForecastOutput> {
    let request = args.request()?;
    let config = args.config()?;
    let result = pipeline::run(&request, &config)?;
    Ok(ForecastOutput::from(&result))
}

/// Write the single JSON document and exit with its code
fn finish(output: ForecastOutput) -> ! {
    let code = output.exit_code();
    if let Err(error) = write_output(&output) {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
    process::exit(code);
}

fn write_output(output: &ForecastOutput) -> anyhow::Result<()> {
    let json = serde_json::to_string(output).context("failed to serialize output")?;
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", json).context("failed to write output")?;
    handle.flush().context("failed to flush stdout")?;
    Ok(())
}
