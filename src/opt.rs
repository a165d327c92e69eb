use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[clap(
    name = "lio-import",
    about = "Convert a task directory of an olympiad into a proglv task package"
)]
pub struct Opt {
    /// Directory of the task to convert
    #[clap(long = "source")]
    pub source: PathBuf,

    /// Format of the source task. Only lio2024 is supported
    #[clap(long = "format", default_value = "lio2024")]
    pub format: String,

    /// Directory where the new `<source name>_proglv` directory will be placed
    #[clap(long = "dest")]
    pub dest: PathBuf,

    /// Parse the task and print problem.toml, without writing anything
    #[clap(long = "dry-run")]
    pub dry_run: bool,

    #[clap(flatten)]
    pub logger: LoggerOpt,
}

#[derive(Parser, Debug, Clone)]
pub struct LoggerOpt {
    /// Verbose mode (-v, -vv, -vvv, etc.)
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl LoggerOpt {
    pub fn enable_log(&self) {
        if self.verbose > 0 {
            std::env::set_var("RUST_BACKTRACE", "1");
            match self.verbose {
                0 => unreachable!(),
                1 => std::env::set_var("RUST_LOG", "info"),
                2 => std::env::set_var("RUST_LOG", "debug"),
                _ => std::env::set_var("RUST_LOG", "trace"),
            }
        }

        env_logger::Builder::from_default_env()
            .format_timestamp_nanos()
            .init();
        better_panic::install();
    }
}
