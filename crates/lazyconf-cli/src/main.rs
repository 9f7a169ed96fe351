use std::process::ExitCode;

fn main() -> ExitCode {
    lazyconf_cli::run()
}
