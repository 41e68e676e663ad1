use gact::cli::Cli;
use gact::error::GactError;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = cli.execute() {
        eprintln!("error: {err:#}");
        std::process::exit(exit_code(&err));
    }
}

// invalid arguments exit 2, everything else exits 1 (clap handles its own
// parse errors with exit 2 before we get here)
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<GactError>() {
        Some(GactError::InvalidDate(_)) => 2,
        _ => 1,
    }
}
