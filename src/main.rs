use mediatracks::cli::run;

fn main() {
    std::process::exit(run());
}
