use chrono::Local;
use colored::*;
use env_logger::fmt::Formatter;
use log::{Level, Record};
use std::io::Write;

pub fn init_logger(log_level: &str) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level));
    builder.format(format_log);
    // Stdout carries the transcript; keep logs out of it.
    builder.target(env_logger::Target::Stderr);

    builder.filter(Some("actix"), log::LevelFilter::Warn);
    builder.filter(Some("actix_rt"), log::LevelFilter::Warn);

    builder.init();
}

fn format_log(buf: &mut Formatter, record: &Record) -> std::io::Result<()> {
    let level_style = match record.level() {
        Level::Error => "ERROR".truecolor(255, 0, 0),
        Level::Warn => "WARN".truecolor(255, 165, 0),
        Level::Info => "INFO".truecolor(0, 255, 255),
        Level::Debug => "DEBUG".truecolor(138, 43, 226),
        Level::Trace => "TRACE".truecolor(255, 105, 180),
    };

    writeln!(
        buf,
        "{} [{}] {} - {}",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        level_style,
        record.target().dimmed(),
        record.args()
    )
}

pub fn print_banner(title: &str, locale: &str, origin: &str) {
    let border = "=".repeat(60);
    println!("{}", border.purple());
    println!("  {}", title.bold().truecolor(63, 156, 255));
    println!("{}", format!("   - Language: {}", locale).cyan());
    println!("{}", format!("   - Script:   {}", origin).cyan());
    println!("{}", "   - Type a number or an option, \"restart\" to start over, Ctrl-D to quit".cyan());
    println!("{}", border.purple());
}
