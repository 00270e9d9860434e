use clap::Parser;

fn main() -> idpaste::error::Result<()> {
    env_logger::init();
    let args = idpaste::Args::parse();

    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    idpaste::run(stdout, stderr, args)
}
