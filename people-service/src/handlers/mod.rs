pub mod health;
pub mod people;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use people::{create_person, delete_person, list_people, root, update_person};
