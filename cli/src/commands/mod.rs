pub mod health;
pub mod risk;
pub mod survey;
