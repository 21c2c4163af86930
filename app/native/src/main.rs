//! barik - spaces and window synchronization for yabai and `AeroSpace`.
//!
//! Without a subcommand the binary watches the detected window manager and
//! prints every snapshot; see `barik --help` for one-shot commands.

fn main() {
    if let Err(err) = barik_lib::cli::run() {
        eprintln!("barik: {err}");
        std::process::exit(1);
    }
}
