mod boundary;
mod cli;
mod doctor;
mod fmt;
mod hook;
mod models;
mod prune;
mod refs;
mod session;
mod setup;
mod transcript;
mod usage;
mod view;

use anyhow::Result;

fn main() -> Result<()> {
    let raw_args: Vec<String> = std::env::args().skip(1).collect();

    if raw_args.iter().any(|a| a == "--no-color") {
        fmt::disable_color();
    }
    let args: Vec<String> = raw_args.into_iter().filter(|a| a != "--no-color").collect();

    if args.iter().any(|a| a == "--help" || a == "-h")
        || args.first().map(|s| s.as_str()) == Some("help")
    {
        cli::print_help();
        return Ok(());
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("reseco {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    match args.first().map(|s| s.as_str()) {
        Some("prune") => prune::run(cli::parse_prune_args(&args[1..])),
        Some("boundaries") => view::boundaries(
            cli::positional(&args[1..]).as_deref(),
            args[1..].iter().any(|a| a == "--json"),
        ),
        Some("sessions") => view::sessions(),
        Some("restore") => session::restore(cli::positional(&args[1..]).as_deref()),
        Some("hook") => hook::run(),
        Some("setup") => setup::run(),
        Some("doctor") => {
            doctor::run();
            Ok(())
        }
        Some(other) => {
            eprintln!("reseco: unknown command '{other}'\n");
            eprintln!("Run 'reseco help' for usage.");
            std::process::exit(1);
        }
        None => {
            cli::print_help();
            Ok(())
        }
    }
}
