#![no_main]

use libfuzzer_sys::fuzz_target;
use wasure_core::report::{build_view, compute_statistics, render_csv, CsvOptions};
use wasure_core::ResultsDocument;

fuzz_target!(|data: &[u8]| {
    let Ok(doc) = serde_json::from_slice::<ResultsDocument>(data) else {
        return;
    };
    let view = build_view(&compute_statistics(&doc));
    assert!(view.rows.len() <= doc.runtimes().len());
    let _ = render_csv(&doc, CsvOptions { memory: true });
});
