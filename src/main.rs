use doxystub::cli;

fn main() -> anyhow::Result<()> {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
    Ok(())
}
