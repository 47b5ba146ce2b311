fn main() {
    use clap::Parser;
    use std::error::Error;
    let args = livelib_rates::cli::Args::parse();
    livelib_rates::cli::init_logging(args.quiet, args.verbose);

    let stop = livelib_rates::StopSignal::new();
    let handler_stop = stop.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_stop.stop()) {
        tracing::warn!("could not install Ctrl+C handler: {}", e);
    }

    if let Err(e) = livelib_rates::cli::run(&args, &stop) {
        eprintln!("{}", e);
        if args.verbose {
            let mut source = e.source();
            while let Some(s) = source {
                eprintln!("  cause: {}", s);
                source = s.source();
            }
        }
        std::process::exit(e.exit_code());
    }
}
