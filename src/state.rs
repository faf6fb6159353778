use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::graphql::Schema;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Config,
    pub schema: Schema,
}
