use std::process::ExitCode;

fn main() -> ExitCode {
    media_convert_lib::run()
}
