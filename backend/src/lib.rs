//---------------------------------------
pub mod web_api {
    pub mod routes;
    pub mod controllers;
    pub mod extractors;
}

pub use web_api::routes::map_routes;
pub use web_api::controllers::*;
//---------------------------------------

//---------------------------------------
pub mod shared {
    pub mod models;
    pub mod dto;
}

pub use shared::models::*;
pub use shared::dto::*;
//---------------------------------------

//---------------------------------------
pub mod services {
    pub mod task_query;
    pub mod task_mutation;
    pub mod tag_service;
    pub mod category_service;
}
//---------------------------------------

//---------------------------------------
pub mod data_access {
    pub mod data_context;
}
//---------------------------------------

//---------------------------------------
pub mod error;
//---------------------------------------
