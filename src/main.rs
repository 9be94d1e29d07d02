fn main() {
    if let Err(err) = star_managed::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
