pub mod assignment;
pub mod class;
pub mod user;
pub mod worksheet;

pub use assignment::Entity as Assignment;
pub use class::Entity as Class;
pub use user::Entity as User;
pub use worksheet::Entity as Worksheet;
