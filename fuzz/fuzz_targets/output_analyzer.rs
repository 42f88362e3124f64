#![no_main]

use libfuzzer_sys::fuzz_target;
use wasure_core::engine::analyze::OutputPatterns;
use wasure_core::{BenchmarkSpec, RuntimeSpec};

fuzz_target!(|data: &[u8]| {
    let output = String::from_utf8_lossy(data);

    let mut benchmark = BenchmarkSpec::new("coremark", "coremark.wasm");
    benchmark.output_validator = Some("Correct operation validated".into());
    benchmark.score_parser = Some(r"Score: (?P<score>\S+)".into());
    let mut runtime = RuntimeSpec::new("rt", "rt {payload}");
    runtime
        .stats_parser
        .insert("cycles".into(), r"cycles=(?P<cycles>\d+)".into());

    let Ok(patterns) = OutputPatterns::compile(&benchmark, &runtime) else {
        return;
    };
    let analysis = patterns.analyze(&output);
    assert!(analysis.score.is_finite());
    if !analysis.valid {
        assert_eq!(analysis.score, 0.0);
        assert!(analysis.stats.is_empty());
    }
});
