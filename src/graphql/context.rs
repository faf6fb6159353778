use crate::auth::Identity;
use crate::state::SharedState;

/// Per-request context: shared state plus whoever the bearer token resolved to.
pub struct GraphQLContext {
    pub state: SharedState,
    pub identity: Option<Identity>,
}

impl juniper::Context for GraphQLContext {}

impl GraphQLContext {
    pub fn new(state: SharedState, identity: Option<Identity>) -> Self {
        Self { state, identity }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}
