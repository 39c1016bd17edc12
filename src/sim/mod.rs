pub mod behavior;
pub mod event;
pub mod level;
pub mod step;
pub mod world;
