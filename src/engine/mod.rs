pub mod constructs;
pub mod evaluate;
pub mod results;
pub mod sandbox;
