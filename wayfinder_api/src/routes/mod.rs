pub mod complete;
pub mod health;
