use actix_web::{web, App, HttpServer};
use gateway::config::GatewayConfig;
use gateway::infra::db::sanitize_db_url;
use gateway::infra::state::build_state;
use gateway::routes;
use gateway::state::security_config::SecurityConfig;
use gateway::telemetry;
use tracing::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    telemetry::init_tracing(&config.log);

    info!(
        host = %config.server.host,
        port = config.server.port,
        database = %sanitize_db_url(&config.database.url),
        rate_limit_burst = config.rate_limit.burst,
        rate_limit_interval_ms = config.rate_limit.interval.as_millis() as u64,
        "starting gateway"
    );

    let app_state = match build_state()
        .with_database(config.database.clone())
        .with_security(SecurityConfig::from(&config.jwt))
        .with_rate_limit(config.rate_limit)
        .build()
        .await
    {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to build application state");
            std::process::exit(1);
        }
    };

    let data = web::Data::new(app_state);

    // actix handles SIGINT/SIGTERM; in-flight requests get `shutdown_timeout` to finish.
    let result = HttpServer::new(move || {
        let data = data.clone();
        App::new().configure(move |cfg| routes::configure(cfg, &data))
    })
    .shutdown_timeout(config.server.shutdown_timeout.as_secs())
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await;

    info!("gateway stopped");
    result
}
