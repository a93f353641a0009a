mod debates;
mod health;
mod poll;
mod retrigger;
mod status;
mod test_debate;
mod test_hansard;

pub use debates::{__path_list_debates, list_debates};
pub use health::{__path_health, health};
pub use poll::{__path_trigger_poll, trigger_poll};
pub use retrigger::{__path_retrigger, retrigger};
pub use status::{__path_status, status};
pub use test_debate::{__path_test_debate, test_debate};
pub use test_hansard::{__path_test_hansard, test_hansard};
