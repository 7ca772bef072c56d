mod settings;

pub use settings::{Config, ConfigError, DEFAULT_COPY_CHUNK_SIZE, EXAMPLE_CONFIG};
