use std::sync::atomic::{AtomicBool, Ordering::SeqCst};

static ENABLED: AtomicBool = AtomicBool::new(true);

pub fn disable() {
    ENABLED.store(false, SeqCst);
}

macro_rules! info {
    ($($arg:tt)*) => (crate::status::println(format!($($arg)*)));
}

macro_rules! warning {
    ($($arg:tt)*) => (crate::status::eprintln(format!($($arg)*)));
}

pub fn println(message: String) {
    if ENABLED.load(SeqCst) {
        println!("::: {message}");
    }
}

pub fn eprintln(message: String) {
    if ENABLED.load(SeqCst) {
        eprintln!("!!! {message}");
    }
}

pub(crate) use info;
pub(crate) use warning;
