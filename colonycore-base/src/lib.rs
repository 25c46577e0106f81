mod attr;
mod cancel;
mod clock;
mod error;
mod id;
mod rule_result;

pub use attr::{AttrMap, AttrValue, Primitive};
pub use cancel::CancellationToken;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CoreError, CoreResult};
pub use id::EntityId;
pub use rule_result::{RuleResult, Severity, Violation};
