//! Version command

/// Run the version command.
pub fn run() {
    println!("archsmith {}", env!("CARGO_PKG_VERSION"));
}
