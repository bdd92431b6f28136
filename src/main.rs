use std::process;

fn main() {
    if let Err(err) = tosca::cli::main() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
