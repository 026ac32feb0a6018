pub mod authors;
pub mod books;
pub mod handlers;
pub mod middleware;
pub mod remote;
pub mod routes;

pub use routes::create_router;
