fn main() {
    if let Err(err) = manitto_lib::run() {
        eprintln!("manitto: {}", err);
        std::process::exit(1);
    }
}
