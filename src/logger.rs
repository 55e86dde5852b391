//! Log output setup.
//!
//! Messages go to stderr as `[LEVEL] message`; the debug flag widens the
//! level filter. Stdout stays reserved for command output (JSON dumps).

use log::LevelFilter;

pub fn init(debug: bool) -> Result<(), log::SetLoggerError> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{}] {}", record.level(), message));
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
}
