fn main() {
    if let Err(e) = medisummarize_lib::run() {
        eprintln!("medisummarize: {e}");
        std::process::exit(1);
    }
}
