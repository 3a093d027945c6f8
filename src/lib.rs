pub mod config;
pub mod observer;
pub mod server;
pub mod statistics;

use std::sync::Arc;

use service::Service;

use self::{config::Config, observer::Observer, statistics::Statistics};

/// In order to let the integration tests start the relay directly from the
/// gss-server crate, a function is opened to replace the main function.
pub async fn startup(config: Arc<Config>) -> anyhow::Result<()> {
    let statistics = Statistics::default();
    let service = Service::new(Observer::new(statistics.clone()));

    let _server = server::start(&config, &statistics, &service).await?;

    // The relay is non-blocking after it runs; keep the daemon from
    // exiting until the supervisor kills it.
    std::future::pending::<()>().await;

    Ok(())
}
