mod change;
mod driver;
mod snapshot;
mod store;
mod transaction;
mod view;

pub use change::{Action, Change, ChangePayload};
pub use driver::DriverConfig;
pub use snapshot::{EntityMap, Snapshot};
pub use store::Store;
pub use transaction::Transaction;
pub use view::{NoopEvaluator, RuleEvaluator, RuleView};
