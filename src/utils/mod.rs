pub mod app_initializer;

pub use app_initializer::{
    AppContext, cleanup_app, get_db_connection, get_logger, initialize_app, initialize_app_with,
    run_app,
};
