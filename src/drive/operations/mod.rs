// Drive operation traits and implementations
pub mod create;
pub mod get;
pub mod list;
pub mod trash;

pub use create::Creator;
pub use get::Getter;
pub use list::Lister;
pub use trash::Trasher;
