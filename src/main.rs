use ddlt::cli::driver;

fn main() {
    let code = driver::run(std::env::args().collect(), &mut std::io::stdout());
    std::process::exit(code);
}
