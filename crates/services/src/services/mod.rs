pub mod identity;
pub mod limits;
pub mod projects;
pub mod revalidation;
pub mod users;
