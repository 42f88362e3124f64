use super::super::args::{BenchmarksDirArg, RuntimesFileArg};
use super::absolute;
use crate::exit_codes::SUCCESS;
use anyhow::Context;
use wasure_core::catalog::{BenchmarkCatalog, RuntimeCatalog};

pub fn render_benchmarks(catalog: &BenchmarkCatalog) -> String {
    if catalog.is_empty() {
        return "No benchmarks found.\n".to_string();
    }
    let mut out = String::from("Available benchmarks:\n");
    for group in catalog.groups() {
        out.push_str(&format!(" * {}:\n", group.name));
        for benchmark in &group.benchmarks {
            out.push_str(&format!("   ↳ {}\n", benchmark.name));
        }
    }
    out
}

pub fn render_runtimes(catalog: &RuntimeCatalog) -> String {
    if catalog.is_empty() {
        return "No runtimes installed.\n".to_string();
    }
    let mut out = String::from("Installed runtimes:\n");
    for runtime in catalog.runtimes() {
        out.push_str(&format!(" * {}\n", runtime.name));
        for sub in &runtime.subruntimes {
            out.push_str(&format!("   ↳ {}\n", sub.name));
        }
    }
    out
}

pub(crate) fn benchmarks(arg: BenchmarksDirArg) -> anyhow::Result<i32> {
    let dir = absolute(&arg.benchmarks_dir)?;
    let catalog = BenchmarkCatalog::load(&dir).context("failed to load benchmarks")?;
    print!("{}", render_benchmarks(&catalog));
    Ok(SUCCESS)
}

pub(crate) fn runtimes(arg: RuntimesFileArg) -> anyhow::Result<i32> {
    let file = absolute(&arg.runtimes_file)?;
    let catalog = RuntimeCatalog::load(&file).context("failed to load runtimes")?;
    print!("{}", render_runtimes(&catalog));
    Ok(SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasure_core::RuntimeSpec;

    #[test]
    fn runtimes_show_subruntimes_under_parent() {
        let mut wamr = RuntimeSpec::new("wamr", "wamr/iwasm {payload}");
        wamr.subruntimes.push(RuntimeSpec::new("wamr-aot", "wamr/iwasm {payload}"));
        let catalog = RuntimeCatalog::new(vec![RuntimeSpec::new("wasmtime", "wasmtime {payload}"), wamr]);
        assert_eq!(
            render_runtimes(&catalog),
            "Installed runtimes:\n * wasmtime\n * wamr\n   ↳ wamr-aot\n"
        );
    }

    #[test]
    fn empty_catalogs_say_so() {
        assert_eq!(render_runtimes(&RuntimeCatalog::default()), "No runtimes installed.\n");
        assert_eq!(render_benchmarks(&BenchmarkCatalog::default()), "No benchmarks found.\n");
    }
}
