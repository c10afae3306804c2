macro_rules! println_with_time {

    () => { println!(); };
    ($($arg:tt)*) => {
        println!("{} ~ {}", chrono::Local::now().format("%H:%M:%S"), format!($($arg)*))
    }
}

macro_rules! warn_with_time {
    ($($arg:tt)*) => {
        println_with_time!("Warning: {}", format!($($arg)*))
    }
}
