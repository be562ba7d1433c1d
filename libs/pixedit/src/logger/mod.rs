use log::LevelFilter;
use std::io::Write;

pub fn init_logger_exe() {
    let name = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.file_stem().and_then(|stem| stem.to_str()).map(str::to_owned))
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
    init_logger(name);
}

/// Installs the process logger. `RUST_LOG` directives take precedence over the
/// defaults set here.
pub fn init_logger(name: impl Into<String>) {
    let crate_name = name.into().replace('-', "_");

    let result = env_logger::builder()
        .filter_level(LevelFilter::Info)
        .filter(Some(&crate_name), LevelFilter::Debug)
        .filter(Some(env!("CARGO_CRATE_NAME")), LevelFilter::Debug)
        .parse_default_env()
        .format(move |f, rec| {
            let now = humantime::format_rfc3339_millis(std::time::SystemTime::now());
            let module = rec.module_path().unwrap_or("<unknown>");
            let line = rec.line().unwrap_or(u32::MIN);
            let level = rec.level();

            writeln!(
                f,
                "[{} {} {} {}:{}] {}",
                level,
                crate_name,
                now,
                module,
                line,
                rec.args()
            )
        })
        .try_init();

    if let Err(e) = result {
        log::debug!("Logger already initialised: {}", e);
    }
}
