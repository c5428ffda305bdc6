pub mod blocks;
pub mod forms;
pub mod interactions;
pub mod public;
