use std::sync::Arc;

use crate::config::Config;
use crate::oauth::IdentityProvider;
use crate::services::{EventAuthorizationService, MemberService};
use crate::store::Store;

/// Shared state handed to every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub events: EventAuthorizationService,
    pub members: MemberService,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>, identity: Arc<dyn IdentityProvider>) -> Self {
        let members = MemberService::new(store.clone(), identity, config.jwt.clone());
        Self {
            config: Arc::new(config),
            events: EventAuthorizationService::new(store),
            members,
        }
    }
}
