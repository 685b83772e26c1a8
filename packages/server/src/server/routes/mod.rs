// HTTP routes
pub mod health;
pub mod locations;
pub mod posts;
pub mod upload;

pub use health::*;
pub use locations::*;
pub use posts::*;
pub use upload::*;
