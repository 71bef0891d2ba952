use std::sync::Arc;

use crate::data_access::data_context::DataContext;

pub struct AppState {
    pub data_context: DataContext,
}

pub type SharedState = Arc<AppState>;
