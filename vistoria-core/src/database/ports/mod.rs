//! Repository ports grouped by bounded context.

pub mod images;
pub mod users;
