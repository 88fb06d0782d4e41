//! Scoped structured logging, split into a always-available `prelude` of
//! `slog_scope` macros and an optional `binary` feature that wires up an
//! actual terminal drain for standalone hosts/examples.

pub mod prelude {
    pub use slog::{self, o};
    pub use slog_scope::{crit, debug, error, info, trace, warn};
}

#[cfg(feature = "binary")]
mod init {
    use slog::{Drain, Level};
    use slog_scope::GlobalLoggerGuard;

    pub struct LoggerBuilder {
        level: Level,
    }

    pub struct Logger(Level, #[allow(dead_code)] GlobalLoggerGuard);

    impl Default for LoggerBuilder {
        fn default() -> Self {
            Self { level: Level::Info }
        }
    }

    impl LoggerBuilder {
        pub fn with_env() -> Self {
            let mut builder = Self::default();
            if let Ok(env) = std::env::var("PURSUIT_LOG") {
                if let Ok(level) = env.parse() {
                    builder.level = level;
                }
            }
            builder
        }

        pub fn level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        pub fn init(self) -> Logger {
            let decorator = slog_term::TermDecorator::new().stdout().build();
            let drain = slog_term::CompactFormat::new(decorator).build().fuse();
            let drain = drain.filter_level(self.level).fuse();
            let drain = slog_async::Async::new(drain)
                .thread_name("logging".to_owned())
                .chan_size(1024)
                .build_no_guard()
                .fuse();
            let logger = slog::Logger::root(drain, slog::o!());

            let guard = slog_scope::set_global_logger(logger);
            Logger(self.level, guard)
        }
    }

    impl Logger {
        pub fn level(&self) -> Level {
            self.0
        }
    }
}

#[cfg(feature = "binary")]
pub use init::LoggerBuilder;

#[cfg(test)]
mod tests_support {
    use once_cell::sync::OnceCell;
    use slog::Drain;
    use slog_scope::GlobalLoggerGuard;
    use std::sync::Mutex;

    static LOGGER: OnceCell<GlobalLoggerGuard> = OnceCell::new();

    /// Installs a synchronous terminal logger once per test process.
    #[allow(dead_code)]
    pub fn for_tests() {
        LOGGER.get_or_init(|| {
            let drain = slog_term::TermDecorator::new().stdout().build();
            let drain = slog_term::CompactFormat::new(drain).build();
            let drain = Mutex::new(drain).fuse();
            let logger = slog::Logger::root(drain, slog::o!());
            slog_scope::set_global_logger(logger)
        });
    }
}

#[cfg(test)]
pub use tests_support::for_tests;
