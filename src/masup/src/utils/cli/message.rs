//! Console output macros used by the command line handlers.
//! Callers need `colored::Colorize` in scope.
#[macro_export]
macro_rules! success_message {
    ($($arg:tt)*) => {{
        println!("{} {}", "[SUCCESS]".green().bold(), format!($($arg)*));
    }};
}

#[macro_export]
macro_rules! error_message {
    ($($arg:tt)*) => {{
        eprintln!("{} {}", "  [ERROR]".red().bold(), format!($($arg)*));
    }};
}

#[macro_export]
macro_rules! warning_message {
    ($($arg:tt)*) => {{
        println!("{} {}", "[WARNING]".yellow().bold(), format!($($arg)*));
    }};
}

#[macro_export]
macro_rules! info_message {
    ($($arg:tt)*) => {{
        println!("{} {}", "   [INFO]".cyan().bold(), format!($($arg)*));
    }};
}

/// Prints one activity log line: `OPEN`/`CLOSE` tagged and coloured.
#[macro_export]
macro_rules! activity_message {
    ($opened:expr, $($arg:tt)*) => {
        if $opened {
            println!("{} {}", "   [OPEN]".green().bold(), format!($($arg)*));
        } else {
            println!("{} {}", "  [CLOSE]".magenta().bold(), format!($($arg)*));
        }
    };
}
