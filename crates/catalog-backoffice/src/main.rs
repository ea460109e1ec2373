//! Demo entry point: wires the session store, transport and controllers
//! together and walks through the screens a user would visit: login,
//! public browsing, and (for admins) the backoffice listings.
//!
//! Credentials come from `CATALOG_EMAIL` / `CATALOG_PASSWORD`; a session
//! persisted by a previous run is reused without re-authenticating.

use catalog_backoffice::{auth, config, resources};
use catalog_client::session::FileStorage;
use catalog_client::tracing::setup_tracing;
use catalog_client::{ApiTransport, Guard, GuardOutcome, HttpTransport, Phase, SessionStore};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let base_url = config::api_url();
    info!(%base_url, "starting catalog backoffice client");

    let store = SessionStore::open(FileStorage::new(config::session_file()));
    let transport: Arc<dyn ApiTransport> =
        Arc::new(HttpTransport::new(base_url, Arc::new(store.clone())));

    if store.is_authenticated() {
        let user = store.current_user().map(|u| u.name).unwrap_or_default();
        info!(%user, "reusing persisted session");
    } else {
        let email = std::env::var("CATALOG_EMAIL").unwrap_or_default();
        let password = std::env::var("CATALOG_PASSWORD").unwrap_or_default();
        auth::validate_login(&email, &password)?;

        store.authenticate(transport.as_ref(), &email, &password).await?;
        info!(%email, "logged in");
    }

    // Front office: the guarded public listings.
    if let GuardOutcome::Redirect(route) = Guard::SessionRequired.check(&store) {
        warn!(?route, "session guard denied the catalog");
        return Ok(());
    }

    let characters = resources::character::public_controller(transport.clone());
    characters.load().await;
    match characters.phase() {
        Phase::Ready(items) => info!(count = items.len(), "characters listed"),
        Phase::Failed(message) => warn!(%message, "character listing failed"),
        _ => {}
    }

    let planets = resources::planet::public_controller(transport.clone());
    planets.load().await;
    for planet in planets.items() {
        info!(
            name = planet.text("name").unwrap_or("unnamed"),
            population = planet.number("poblation").unwrap_or(0.0),
            "planet"
        );
    }

    // Backoffice: admin-gated user management.
    match Guard::AdminRequired.check(&store) {
        GuardOutcome::Permit => {
            let users = resources::user::backoffice_controller(transport);
            users.load().await;
            info!(count = users.items().len(), "backoffice users listed");
        }
        GuardOutcome::Redirect(route) => {
            info!(?route, "not an admin, skipping the backoffice");
        }
    }

    Ok(())
}
