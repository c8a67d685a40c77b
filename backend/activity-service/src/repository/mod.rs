mod memory;
mod postgres;
mod r#trait;

pub use memory::InMemoryActivityRepository;
pub use postgres::PgActivityRepository;
pub use r#trait::ActivityRepository;
