fn main() {
    if let Err(err) = home_energy_api::app::run() {
        eprintln!("api startup failed: {err}");
        std::process::exit(1);
    }
}
