//! `pgdeploy` entrypoint.

fn main() {
    let code = pgdeploy_cli::run();
    if code != 0 {
        std::process::exit(code);
    }
}
