use bus_core::cli::StartupOptions;

use dynamic_desktop::launcher;

#[tokio::main]
async fn main() {
    let options = StartupOptions::parse_lenient(std::env::args_os());
    let code = launcher::run(options).await;
    std::process::exit(code);
}
