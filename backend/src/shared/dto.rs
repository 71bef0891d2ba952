// Requests
pub mod bulk_requests;
pub mod category_requests;
pub mod create_task_request;
pub mod tag_requests;
pub mod task_list_query;
pub mod update_task_request;


// Responses
pub mod message_response;
pub mod stats_response;
pub mod task_list_response;
pub mod task_response;
