#![no_main]

use libfuzzer_sys::fuzz_target;
use sqlweave::dialects::{Dialect, DialectType};
use sqlweave::{ErrorLevel, ParseOptions};

fuzz_target!(|data: &[u8]| {
    let Ok(sql) = std::str::from_utf8(data) else {
        return;
    };
    for dialect_type in DialectType::ALL {
        let dialect = Dialect::get(dialect_type);
        // Errors are fine, panics are not
        let _ = dialect.parse(sql);
        let _ = dialect.parse_with_options(sql, ParseOptions { error_level: ErrorLevel::Lenient });
    }
});
