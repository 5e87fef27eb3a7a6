use std::io::{self, Write};

use multiconv::harness::{run_once_with_output, RunConfig};
use multiconv::kernels::Backend;
use multiconv::shape::ConvShape;
use multiconv::tensor::write_tensor3;

use super::OutputFormat;

/// Positional shape and options for one `run` invocation
pub struct RunArgs {
    pub width: usize,
    pub height: usize,
    pub kernel_order: usize,
    pub nchannels: usize,
    pub nkernels: usize,
    pub seed: u64,
    pub threads: Option<usize>,
    pub backend: String,
    pub dump: bool,
}

pub fn run(args: &RunArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let shape = ConvShape::new(
        args.width,
        args.height,
        args.kernel_order,
        args.nchannels,
        args.nkernels,
    )?;
    let backend: Backend = args.backend.parse()?;
    let config = RunConfig::new(shape).with_seed(args.seed).with_backend(backend);

    let (report, output) = super::install(args.threads, || run_once_with_output(&config))??;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)?;
            println!("{json}");
        }
        OutputFormat::Text => super::print_text(&report)?,
    }

    if args.dump {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        write_tensor3(&mut lock, &output)?;
        lock.flush()?;
    }

    Ok(())
}
