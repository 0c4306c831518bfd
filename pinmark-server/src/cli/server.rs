use axum::Router;
use pinmark_core::{config::Configuration, error::PinmarkResult, state::PinmarkState};
use pinmark_models::Client;

use crate::pages::{self, not_found_page};

pub async fn run_migrations(config: &Configuration) -> PinmarkResult<()> {
    match config.db_conn().await? {
        Some(db) => Client::new(db).migrate().await?,
        None => warn!("No DATABASE_URL configured, there is nothing to migrate"),
    }
    Ok(())
}

pub fn setup_all_routes(router: Router<PinmarkState>) -> Router<PinmarkState> {
    pages::images::image_pages(router)
}

pub fn axum_setup(state: PinmarkState) -> Router {
    let router = setup_all_routes(Router::new());
    router.fallback(not_found_page).with_state(state)
}

pub async fn server_start(config: Configuration, migrate: bool) -> PinmarkResult<()> {
    info!("Starting with config {:?}", config);
    let state = PinmarkState::new(config.clone()).await?;
    if migrate {
        state.get_db_client().migrate().await?;
    }
    debug!("Configuring application server");
    let app = axum_setup(state);

    info!("Listening on {}", config.bind_to);
    let server = axum::Server::bind(&config.bind_to).serve(app.into_make_service());
    match server.await {
        Ok(()) => error!("server exited cleanly but unexpectedly"),
        Err(e) => {
            error!("Could not start server: {:?}", e);
            return Err(e.into());
        }
    }
    Ok(())
}
