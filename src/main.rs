use actix_web::{middleware::Logger, web, App, HttpServer};

use quizforge_server::{
    app_state::AppState, config::Config, handlers, middleware::RequestIdMiddleware,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    config.validate().map_err(std::io::Error::other)?;

    let bind_addr = (config.web_server_host.clone(), config.web_server_port);
    let state = AppState::new(config)
        .await
        .map_err(std::io::Error::other)?;

    log::info!("Starting HTTP server on {}:{}", bind_addr.0, bind_addr.1);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .wrap(RequestIdMiddleware)
            .configure(handlers::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
