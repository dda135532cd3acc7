use comanda_server::{Config, Server, ServerState, print_banner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 环境 (dotenv + 日志)
    dotenv::dotenv().ok();
    let config = Config::from_env();
    comanda_server::init_logger_with_file(None, config.log_dir.as_deref());

    print_banner();
    tracing::info!("Comanda server starting...");

    // 2. 初始化状态 (SQLite + 订单引擎)
    let state = ServerState::initialize(&config).await?;

    // 3. 启动 HTTP 服务
    let server = Server::with_state(config, state);
    server.run().await?;

    Ok(())
}
