use std::io::{self, Write};

use polycalc::calculator;

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let stderr = io::stderr();

    let mut out = stdout.lock();
    let mut err = stderr.lock();
    calculator::run_session(stdin.lock(), &mut out, &mut err)?;
    out.flush()
}
