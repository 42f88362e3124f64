//! Peak memory sampling for a running child and its descendants.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use sysinfo::{Pid, ProcessRefreshKind, System};

/// Running maxima in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryPeak {
    pub rss: u64,
    pub vms: u64,
}

impl MemoryPeak {
    fn observe(&mut self, rss: u64, vms: u64) {
        self.rss = self.rss.max(rss);
        self.vms = self.vms.max(vms);
    }
}

/// One row of a process table snapshot.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ProcessUsage {
    pub pid: u32,
    pub parent: Option<u32>,
    pub rss: u64,
    pub vms: u64,
}

/// `root` and every process descending from it, or `None` when `root` is
/// not in the snapshot.
pub(crate) fn subtree(snapshot: &[ProcessUsage], root: u32) -> Option<Vec<ProcessUsage>> {
    let root_usage = snapshot.iter().find(|p| p.pid == root)?;

    let mut children: HashMap<u32, Vec<&ProcessUsage>> = HashMap::new();
    for proc_usage in snapshot {
        if let Some(parent) = proc_usage.parent {
            if proc_usage.pid != parent {
                children.entry(parent).or_default().push(proc_usage);
            }
        }
    }

    let mut members = vec![*root_usage];
    let mut stack = vec![root];
    while let Some(pid) = stack.pop() {
        for child in children.get(&pid).into_iter().flatten() {
            if members.iter().any(|m| m.pid == child.pid) {
                continue;
            }
            members.push(**child);
            stack.push(child.pid);
        }
    }
    Some(members)
}

fn total(members: &[ProcessUsage]) -> (u64, u64) {
    members.iter().fold((0u64, 0u64), |(rss, vms), p| {
        (rss.saturating_add(p.rss), vms.saturating_add(p.vms))
    })
}

/// Sums RSS/VMS over `root` and every process descending from it.
/// Returns `None` when `root` is not in the snapshot.
pub(crate) fn tree_usage(snapshot: &[ProcessUsage], root: u32) -> Option<(u64, u64)> {
    subtree(snapshot, root).map(|members| total(&members))
}

/// Samples between two scans of the whole process table. In between, only
/// the processes already known to be in the tree are refreshed.
const RESCAN_EVERY: u32 = 10;

pub struct MemoryProbe {
    system: System,
    root: u32,
    tree: Vec<u32>,
    samples: u32,
    full_scans: u32,
    peak: MemoryPeak,
}

impl MemoryProbe {
    pub fn new(root: u32) -> Self {
        Self {
            system: System::new(),
            root,
            tree: Vec::new(),
            samples: 0,
            full_scans: 0,
            peak: MemoryPeak::default(),
        }
    }

    pub fn peak(&self) -> MemoryPeak {
        self.peak
    }

    /// Takes one sample. Returns `false` once the root process is gone.
    pub fn sample(&mut self) -> bool {
        let full = self.samples % RESCAN_EVERY == 0;
        self.samples = self.samples.wrapping_add(1);
        let usage = if full { self.scan_all() } else { self.scan_tree() };
        match usage {
            Some((rss, vms)) => {
                self.peak.observe(rss, vms);
                true
            }
            None => false,
        }
    }

    /// Refreshes the whole table and rediscovers the tree.
    fn scan_all(&mut self) -> Option<(u64, u64)> {
        self.full_scans += 1;
        self.system
            .refresh_processes_specifics(ProcessRefreshKind::new().with_memory());

        self.system.process(Pid::from_u32(self.root))?;

        // On Linux threads show up as processes too; count each address space once.
        let threads: HashSet<Pid> = self
            .system
            .processes()
            .iter()
            .filter_map(|(pid, process)| process.tasks().map(|tasks| (pid, tasks)))
            .flat_map(|(pid, tasks)| tasks.iter().filter(move |tid| *tid != pid).copied())
            .collect();

        let snapshot: Vec<ProcessUsage> = self
            .system
            .processes()
            .iter()
            .filter(|(pid, _)| !threads.contains(pid))
            .map(|(pid, process)| ProcessUsage {
                pid: pid.as_u32(),
                parent: process.parent().map(|p| p.as_u32()),
                rss: process.memory(),
                vms: process.virtual_memory(),
            })
            .collect();

        let members = subtree(&snapshot, self.root)?;
        self.tree = members.iter().map(|m| m.pid).collect();
        Some(total(&members))
    }

    /// Refreshes only the known tree members; exited ones are dropped.
    fn scan_tree(&mut self) -> Option<(u64, u64)> {
        let kind = ProcessRefreshKind::new().with_memory();
        let system = &mut self.system;
        let mut usage = Vec::with_capacity(self.tree.len());
        self.tree.retain(|&pid| {
            let pid = Pid::from_u32(pid);
            if !system.refresh_process_specifics(pid, kind) {
                return false;
            }
            match system.process(pid) {
                Some(process) => {
                    usage.push((process.memory(), process.virtual_memory()));
                    true
                }
                None => false,
            }
        });

        if !self.tree.contains(&self.root) {
            return None;
        }
        Some(usage.iter().fold((0u64, 0u64), |(rss, vms), (r, v)| {
            (rss.saturating_add(*r), vms.saturating_add(*v))
        }))
    }

    /// Polls every `interval` until `stop` is raised or the process disappears.
    pub fn run(mut self, interval: Duration, stop: Arc<AtomicBool>) -> MemoryPeak {
        while !stop.load(Ordering::Acquire) {
            if !self.sample() {
                break;
            }
            std::thread::sleep(interval);
        }
        self.peak
    }
}
