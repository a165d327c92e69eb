use std::io::Write;

use anyhow::Error;

/// Adds methods for failing without panic. Like `expect` but without panic.
pub trait NiceError<T> {
    /// Fail exiting with `1` if the value is an error, printing the error and its causes to
    /// stderr. Otherwise return the content.
    fn nice_unwrap(self) -> T;
}

/// Write the error followed by the chain of its causes.
pub fn write_error<W: Write>(error: &Error, out: &mut W) -> std::io::Result<()> {
    let mut chain = error.chain();
    if let Some(fail) = chain.next() {
        writeln!(out, "Error: {fail}")?;
    }
    for cause in chain {
        writeln!(out, "\nCaused by:\n    {cause}")?;
    }
    Ok(())
}

fn fail(error: Error) -> ! {
    debug!("{:?}", error);
    let _ = write_error(&error, &mut std::io::stderr());
    std::process::exit(1);
}

impl<T> NiceError<T> for Result<T, Error> {
    fn nice_unwrap(self) -> T {
        self.unwrap_or_else(|e| fail(e))
    }
}
