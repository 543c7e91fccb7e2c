//! Main application entry point (native).

#[cfg(feature = "native")]
fn main() {
    env_logger::init();
    log::info!("Starting TaskCanvas");

    let config = taskcanvas_app::AppConfig {
        board_path: std::env::args_os().nth(1).map(std::path::PathBuf::from),
        ..Default::default()
    };
    if let Err(e) = taskcanvas_app::App::run(config) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
