use std::process::ExitCode;

fn main() -> ExitCode {
    product_insight_cli::run()
}
