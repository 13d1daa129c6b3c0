pub mod controller;
pub mod review;
pub mod store;
pub mod timer;
