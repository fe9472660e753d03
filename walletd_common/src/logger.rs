use fern::colors::{Color, ColoredLevelConfig};
use log::{Level, LevelFilter};

pub fn level_from_debug(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

// configure fern to log on stdout with colors and optionally into a file
pub fn setup_logger(level: LevelFilter, filename_log: &str, disable_file_logging: bool) -> Result<(), fern::InitError> {
    let colors = ColoredLevelConfig::new()
        .debug(Color::Green)
        .info(Color::Cyan)
        .warn(Color::Yellow)
        .error(Color::Red);

    let stdout_log = fern::Dispatch::new()
        .format(move |out, message, record| {
            let target = record.target();
            let mut target_with_pad = " ".repeat(20usize.saturating_sub(target.len())) + target;
            if record.level() != Level::Error && record.level() != Level::Debug {
                target_with_pad = " ".to_owned() + &target_with_pad;
            }
            out.finish(format_args!(
                "\x1B[90m{} {}\x1B[0m \x1B[{}m{}\x1B[0m \x1B[90m>\x1B[0m {}",
                chrono::Local::now().format("[%Y-%m-%d] (%H:%M:%S%.3f)"),
                colors.color(record.level()),
                Color::BrightBlue.to_fg_str(),
                target_with_pad,
                message
            ))
        }).chain(std::io::stdout());

    let mut base = fern::Dispatch::new().chain(stdout_log);
    if !disable_file_logging {
        let file_log = fern::Dispatch::new()
            .format(move |out, message, record| {
                out.finish(format_args!(
                    "{} [{}] [{}] | {}",
                    chrono::Local::now().format("[%Y-%m-%d] (%H:%M:%S%.3f)"),
                    record.level(),
                    record.target(),
                    message
                ))
            }).chain(fern::log_file(filename_log)?);
        base = base.chain(file_log);
    }

    base.level(level)
        .level_for("reqwest", LevelFilter::Warn)
        .level_for("hyper", LevelFilter::Warn)
        .apply()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_debug() {
        assert_eq!(level_from_debug(true), LevelFilter::Debug);
        assert_eq!(level_from_debug(false), LevelFilter::Info);
    }
}
