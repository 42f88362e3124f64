#![no_main]

use libfuzzer_sys::fuzz_target;
use std::path::Path;
use wasure_core::engine::template::{render_aot_command, render_run_command};
use wasure_core::{BenchmarkSpec, RuntimeSpec};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let (command, args) = text.split_once('\n').unwrap_or((text, ""));

    let runtime = RuntimeSpec::new("fuzz", command);
    let mut benchmark = BenchmarkSpec::new("fuzz", "fuzz.wasm");
    benchmark.args = Some(args.to_string());
    benchmark.entrypoint = Some("_start".to_string());

    let _ = render_run_command(&runtime, &benchmark, Path::new("/b/g/fuzz.wasm"));
    let _ = render_aot_command(command, Path::new("/b/in.wasm"), Path::new("/b/in.aot"));
});
