//! Client initialization.
//!
//! Wires the credential store, token sources, backend client, platform
//! adapter and notification store together from the loaded configuration.

use std::sync::Arc;

use tracing::info;

use crate::auth::{TokenChain, TokenSource};
use crate::config::ConfigV1;
use crate::error::ClientError;
use crate::http::ApiClient;
use crate::notifications::{create_platform, LogPresenter, NotificationStore, Presenter};
use crate::payments::PaymentSdkLoader;
use crate::state::AppState;
use crate::store::create_store;

/// Builds the client state with toasts rendered through the log.
///
/// # Errors
///
/// Returns an error if the credential store, backend URL or platform
/// adapter cannot be set up from the configuration.
pub fn build_state(config: Arc<ConfigV1>) -> Result<AppState, ClientError> {
    build_state_with_presenter(config, Arc::new(LogPresenter))
}

/// Same as [`build_state`] but with a caller-supplied toast presenter.
pub fn build_state_with_presenter(
    config: Arc<ConfigV1>,
    presenter: Arc<dyn Presenter>,
) -> Result<AppState, ClientError> {
    let store = create_store(&config.store).map_err(ClientError::Store)?;

    let chain = TokenChain::from_config(&config.token_sources, config.identity.as_ref(), &store);
    info!("Configured {} token source(s)", chain.len());
    let tokens: Arc<dyn TokenSource> = Arc::new(chain);

    let api = ApiClient::new(&config.backend_url, tokens, &config.http)?;
    let platform = create_platform(&config.platform).map_err(ClientError::Config)?;

    let notifications = NotificationStore::new(
        api.clone(),
        platform,
        presenter,
        &config.push,
        &config.toast,
    );
    let payments = Arc::new(PaymentSdkLoader::new(&config.payments));

    info!("Client ready for backend {}", config.backend_url);

    Ok(AppState {
        config,
        store,
        api,
        notifications,
        payments,
    })
}
