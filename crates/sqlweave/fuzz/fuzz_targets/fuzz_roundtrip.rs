#![no_main]

use libfuzzer_sys::fuzz_target;
use sqlweave::dialects::{Dialect, DialectType};

fuzz_target!(|data: &[u8]| {
    let Ok(sql) = std::str::from_utf8(data) else {
        return;
    };
    for dialect_type in [DialectType::Generic, DialectType::Hive, DialectType::Presto, DialectType::TSQL] {
        let dialect = Dialect::get(dialect_type);
        let Ok(ast) = dialect.parse(sql) else {
            continue;
        };
        for expr in &ast {
            let Ok(once) = dialect.generate(expr) else {
                continue;
            };
            // Output of the generator must parse again in the same dialect
            let reparsed = dialect.parse(&once);
            assert!(reparsed.is_ok(), "{dialect_type}: generated SQL does not parse: {once}");
        }
    }
});
