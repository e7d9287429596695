use crate::error::{Error, Result};
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} | {({l}):5.5} | {t} - {m}{n}";

/// Routes log records to stderr so they never mix with the prompt on stdout
pub fn init(level: LevelFilter) -> Result<()> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .logger(Logger::builder().build("tryolib", level))
        .build(Root::builder().appender("stderr").build(level))
        .map_err(|err| Error::Logging(err.to_string()))?;

    log4rs::init_config(config)
        .map(|_| ())
        .map_err(|err| Error::Logging(err.to_string()))
}
