use coi_server::config::{AppState, Config};
use coi_server::logger;
use coi_server::server::{shutdown_signal, Server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;
    let root = std::env::current_dir()?;
    let state = AppState::new(root.clone());

    let server = match Server::bind(addr, state) {
        Ok(server) => server,
        Err(e) => {
            logger::log_error(&format!("Failed to bind {addr}: {e}"));
            return Err(e.into());
        }
    };

    logger::log_server_start(&server.local_addr()?, &root);
    server.run(shutdown_signal()).await;
    Ok(())
}
