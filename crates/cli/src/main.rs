fn main() {
    autoscroll_cli::init_tracing();

    if let Err(error) = autoscroll_cli::run(std::env::args_os()) {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}
