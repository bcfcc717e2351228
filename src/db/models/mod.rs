mod certification;
mod course;
mod exam;
mod progress;
mod quiz;
mod user;

#[allow(unused)]
pub use certification::*;
#[allow(unused)]
pub use course::*;
#[allow(unused)]
pub use exam::*;
pub use progress::*;
pub use quiz::*;
#[allow(unused)]
pub use user::*;
