//! Command templating.
//!
//! Templates use `{name}` placeholders (`{{` and `}}` are literal braces).
//! Each render builds a small substitution table; a value is only filled in
//! when the template literally references its token, so runtimes that do not
//! support a flag never receive it. Unknown placeholders are left verbatim.

use crate::model::{BenchmarkSpec, RuntimeSpec};
use std::path::Path;

pub const PAYLOAD: &str = "payload";
pub const ENTRYPOINT: &str = "entrypoint";
pub const ENTRYPOINT_FLAG: &str = "entrypoint_flag";
pub const ARGS: &str = "args";
pub const MOUNT_DIR: &str = "mount_dir";
pub const AOT_INPUT: &str = "input";
pub const AOT_OUTPUT: &str = "output";
/// Placeholder inside a benchmark's own `args` template.
pub const ARGS_PATH: &str = "path";

fn references(template: &str, token: &str) -> bool {
    template.contains(&format!("{{{token}}}"))
}

/// Renders the runtime's main command for `benchmark`.
///
/// `payload` is the absolute file handed to the runtime: the AOT artifact when
/// one exists, otherwise the original payload.
pub fn render_run_command(runtime: &RuntimeSpec, benchmark: &BenchmarkSpec, payload: &Path) -> String {
    let template = runtime.command.as_str();
    let payload_dir = payload.parent().unwrap_or_else(|| Path::new(""));
    let dir = payload_dir.to_string_lossy();

    let gated = |token: &str, value: &dyn Fn() -> String| {
        if references(template, token) {
            value()
        } else {
            String::new()
        }
    };

    let table = [
        (PAYLOAD, shell_quote(&payload.to_string_lossy())),
        (
            ENTRYPOINT,
            gated(ENTRYPOINT, &|| benchmark.entrypoint.clone().unwrap_or_default()),
        ),
        (
            ENTRYPOINT_FLAG,
            gated(ENTRYPOINT_FLAG, &|| match benchmark.entrypoint {
                Some(_) => runtime.entrypoint_flag.clone().unwrap_or_default(),
                None => String::new(),
            }),
        ),
        (
            ARGS,
            gated(ARGS, &|| render_args(benchmark.args.as_deref().unwrap_or(""), &dir)),
        ),
        (MOUNT_DIR, gated(MOUNT_DIR, &|| shell_quote(&dir))),
    ];

    substitute(template, &table)
}

/// Expands a benchmark's `args` template. `{path}` becomes the payload
/// directory as an absolute host path, since some sandboxed runtimes cannot
/// remap guest paths.
pub fn render_args(args: &str, payload_dir: &str) -> String {
    substitute(args, &[(ARGS_PATH, payload_dir.to_string())])
}

pub fn render_aot_command(template: &str, input: &Path, output: &Path) -> String {
    let table = [
        (AOT_INPUT, shell_quote(&input.to_string_lossy())),
        (AOT_OUTPUT, shell_quote(&output.to_string_lossy())),
    ];
    substitute(template, &table)
}

/// Wraps `raw` in double quotes for the platform shell.
pub fn shell_quote(raw: &str) -> String {
    let mut quoted = String::with_capacity(raw.len() + 2);
    quoted.push('"');
    for ch in raw.chars() {
        if cfg!(unix) && matches!(ch, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

fn substitute(template: &str, table: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("{{") {
            out.push('{');
            rest = after;
            continue;
        }
        if let Some(after) = tail.strip_prefix("}}") {
            out.push('}');
            rest = after;
            continue;
        }
        if tail.starts_with('{') {
            if let Some(end) = tail.find('}') {
                let key = &tail[1..end];
                if let Some((_, value)) = table.iter().find(|(k, _)| *k == key) {
                    out.push_str(value);
                    rest = &tail[end + 1..];
                    continue;
                }
            }
        }

        // Unknown placeholder or stray brace: both are one byte.
        out.push_str(&tail[..1]);
        rest = &tail[1..];
    }

    out.push_str(rest);
    out
}
