use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;
use tisp_run::{RunConfig, RunError, DEFAULT_STACK_SIZE, MAX_CONCURRENT_OUTPUTS};

#[derive(Parser, Debug)]
#[command(name = "tisp", version, about = "Runs tisp programs in the JSON IR format")]
struct Opt {
    /// Program file (`-` reads stdin)
    #[arg(required_unless_present = "list_builtins")]
    program: Option<PathBuf>,

    /// Maximum number of outputs running at once
    #[arg(long = "max-concurrency", default_value_t = MAX_CONCURRENT_OUTPUTS)]
    max_concurrency: usize,

    /// Stack size of output threads in bytes
    #[arg(long = "stack-size", default_value_t = DEFAULT_STACK_SIZE)]
    stack_size: usize,

    /// More logging (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print the builtin names and exit
    #[arg(long = "list-builtins", default_value_t = false)]
    list_builtins: bool,
}

fn main() -> ExitCode {
    let opt = Opt::parse();
    let level = match opt.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).parse_default_env().init();

    if opt.list_builtins {
        for name in tisp_builtins::names() {
            println!("{name}");
        }
        return ExitCode::SUCCESS;
    }
    let Some(path) = opt.program.as_deref() else {
        return ExitCode::FAILURE;
    };

    let config = RunConfig { max_concurrent_outputs: opt.max_concurrency, stack_size: opt.stack_size };
    match execute(path, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<RunError>() {
                Some(RunError::Output(e)) => eprint!("{}", e.lines()),
                _ => eprintln!("tisp: {e}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn execute(path: &Path, config: &RunConfig) -> Result<(), Box<dyn Error>> {
    let src = read_program(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let module = tisp_ir::load_json(&src)?;
    log::debug!("running {} outputs", module.outputs().len());
    tisp_run::run(module.into_outputs(), config)?;
    Ok(())
}

fn read_program(path: &Path) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut src = String::new();
        io::stdin().read_to_string(&mut src)?;
        Ok(src)
    } else {
        fs::read_to_string(path)
    }
}
