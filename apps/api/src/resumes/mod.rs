// Resume records: storage, processing lifecycle, and the HTTP handlers over them.

pub mod dashboard;
pub mod handlers;
pub mod lifecycle;
pub mod store;
