#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sqlweave::dialects::DialectType;
use sqlweave::{transpile, GenerateOptions};

#[derive(Arbitrary, Debug)]
struct TranspileInput {
    sql: String,
    read: u8,
    write: u8,
    pretty: bool,
}

fn pick(index: u8) -> DialectType {
    DialectType::ALL[index as usize % DialectType::ALL.len()]
}

fuzz_target!(|input: TranspileInput| {
    let options = GenerateOptions {
        pretty: input.pretty,
        ..GenerateOptions::default()
    };
    let _ = transpile(&input.sql, pick(input.read).name(), pick(input.write).name(), &options);
});
