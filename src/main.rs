#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use actix_web::{middleware::Logger, web, App, HttpServer};
use liveauth::{
    handlers::{auth_failure, health, live_callback, live_sign_in},
    oauth::{LiveClient, STRATEGY_NAME},
    session::SessionStore,
    settings::LiveAuthSettings,
    utils::logging::LoggingHelper,
    MicrosoftLiveStrategy,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load configuration from Settings.toml and environment variables
    // This also loads .env file and initializes the logger
    let settings = LiveAuthSettings::load()
        .map_err(|e| std::io::Error::other(format!("Failed to load settings: {e}")))?;

    LoggingHelper::log_provider_init(STRATEGY_NAME, settings.provider.is_configured());
    let options = settings
        .strategy_options()
        .map_err(|e| std::io::Error::other(format!("Failed to configure provider: {e}")))?;
    let client = LiveClient::new(options.clone())
        .map_err(|e| std::io::Error::other(format!("Failed to build HTTP client: {e}")))?;
    let strategy = web::Data::new(MicrosoftLiveStrategy::new(options, client));

    start_server(strategy, settings).await
}

/// Start the HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Server binding fails
/// - Server fails to start
async fn start_server(
    strategy: web::Data<MicrosoftLiveStrategy<LiveClient>>,
    settings: LiveAuthSettings,
) -> std::io::Result<()> {
    let bind_address = settings.get_bind_address();
    print_startup_info(&bind_address, &settings);

    let session_store = SessionStore::new(&settings.session.session_secret, settings.cookies.secure);

    HttpServer::new(move || {
        App::new()
            .app_data(strategy.clone())
            .app_data(web::Data::new(session_store.clone()))
            .app_data(web::Data::new(settings.clone()))
            .wrap(Logger::default())
            .configure(configure_services)
    })
    .bind(&bind_address)?
    .run()
    .await
}

fn configure_services(cfg: &mut web::ServiceConfig) {
    cfg
        // Microsoft Live endpoints
        .route(
            "/auth/microsoft_live",
            web::get().to(live_sign_in::<LiveClient>),
        )
        .route(
            "/auth/microsoft_live/callback",
            web::get().to(live_callback::<LiveClient>),
        )
        .route(
            "/auth/microsoft_live/callback",
            web::post().to(live_callback::<LiveClient>),
        )
        .route("/auth/failure", web::get().to(auth_failure))
        // Health endpoint
        .route("/ping", web::get().to(health));
}

fn print_startup_info(bind_address: &str, settings: &LiveAuthSettings) {
    println!("Starting liveauth on http://{bind_address}");
    println!();
    println!("Microsoft Live endpoints:");
    println!("  GET  /auth/microsoft_live          - Redirect to the Microsoft sign-in page");
    println!("  GET|POST /auth/microsoft_live/callback - OAuth callback");
    println!("  GET  /auth/failure                 - Failure details");
    println!();
    println!("OAuth callback URL to register with Microsoft:");
    println!("  {}", settings.get_redirect_uri());
    println!();
    println!("System endpoints:");
    println!("  GET  /ping            - Health check");
}
