pub mod auth;
pub mod evaluate;
pub mod project;
pub mod task;
pub mod weights;
