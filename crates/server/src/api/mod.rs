pub mod articles;
pub mod handlers;
pub mod middleware;
pub mod refresh;
pub mod routes;
pub mod settings;

pub use routes::create_router;
