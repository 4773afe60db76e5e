use std::sync::Arc;

mod config;
mod error;
mod fanout;
mod handler;
mod http;
mod logger;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    cfg.validate_routes()?;
    logger::init(&cfg)?;

    // 创建 Tokio 运行时，根据 workers 配置设置线程数
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers.filter(|&w| w > 0) {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    // Without the port there is nothing to serve
    let listener = match server::create_listener(addr, cfg.server.reuse_port) {
        Ok(listener) => listener,
        Err(e) => {
            logger::log_error(&e.to_string());
            return Err(e.into());
        }
    };

    let state = Arc::new(config::AppState::new(&cfg));
    logger::log_server_start(&listener.local_addr()?, &cfg);

    server::run(listener, state).await?;
    Ok(())
}
