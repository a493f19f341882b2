pub mod money;
pub mod period;
pub mod record;

pub use money::Money;
pub use period::{DateRange, FiscalYear};
pub use record::{Direction, GstStatus, MatchStatus, Record, Side};
