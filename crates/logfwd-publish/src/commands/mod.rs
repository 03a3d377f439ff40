pub mod publish;
pub mod tags;
