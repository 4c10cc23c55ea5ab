use std::time::Duration;

pub const BAR_LENGTH: u64 = 100;
pub const BAR_TEMPLATE: &str = "{spinner:.green} [{bar:40.cyan/blue}] {prefix:>6} {msg}";
pub const BAR_ERROR_TEMPLATE: &str = "{spinner:.red} [{bar:40.red}] {prefix:>6} {msg:.red}";
pub const BAR_DONE_TEMPLATE: &str = "\u{2714} [{bar:40.green}] {prefix:>6} {msg}";
pub const SPINNER_TICK: Duration = Duration::from_millis(120);
