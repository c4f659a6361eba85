use easy_www::config::Config;
use easy_www::routing::RouterBuilder;
use easy_www::server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let router = RouterBuilder::new().build();

    let server = match Server::bind(cfg, router).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Couldn't start the server: {}", e);
            return Err(e.into());
        }
    };

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
}
