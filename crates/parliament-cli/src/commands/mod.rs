pub mod poll;
pub mod retrigger;
pub mod seed;
pub mod status;
pub mod worker;
