use clap::Parser;

use lio_import::error::NiceError;
use lio_import::{main_import, Opt};

fn main() {
    let opt = match Opt::try_parse() {
        Ok(opt) => opt,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };
    opt.logger.enable_log();

    main_import(&opt).nice_unwrap()
}
