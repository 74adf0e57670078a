//! Satisfies the logging API when the `logging` feature is disabled. Nothing is printed.

use crate::log::LogConfiguration;

impl LogConfiguration {
    pub(in crate::log) fn set_config(&mut self) {
        log::set_max_level(self.global_log_level);
    }
}
