use rms_server::utils::init_logger;
use rms_server::{Config, Server};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    init_logger(&config.log_level);

    if let Err(e) = std::fs::create_dir_all(&config.work_dir) {
        tracing::error!(work_dir = %config.work_dir, error = %e, "cannot create work directory");
        std::process::exit(1);
    }

    if let Err(e) = Server::new(config).run().await {
        tracing::error!(error = %e, "server exited with error");
        std::process::exit(1);
    }
}
