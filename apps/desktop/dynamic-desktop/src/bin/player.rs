// Prevents additional console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use bus_core::cli::StartupOptions;

use dynamic_desktop::player;

#[tokio::main]
async fn main() {
    let options = StartupOptions::parse_lenient(std::env::args_os());
    let code = player::run(options).await;
    std::process::exit(code);
}
