use anyhow::{anyhow, Result};
use chrono::{SecondsFormat, Utc};
use clap::{Args, Parser, Subcommand};
use flowpath_engine::run_cycle;
use flowpath_model::{CycleSummary, FlowRecord, ResolvedFile, TopologySnapshot};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::sleep;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Parser)]
#[command(name = "flowpath", version, about = "Flow-path resolution over topology snapshots")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Resolve(ResolveArgs),
    Run(RunArgs),
    Watch(WatchArgs),
}

#[derive(Args)]
#[command(about = "Resolve one topology/flow snapshot pair into a resolved-paths file")]
struct ResolveArgs {
    #[arg(long)]
    topology: PathBuf,

    #[arg(long)]
    flows: PathBuf,

    #[arg(long)]
    out: PathBuf,
}

#[derive(Args)]
#[command(about = "Run one cycle into an output directory with a run receipt")]
struct RunArgs {
    #[arg(long)]
    topology: PathBuf,

    #[arg(long)]
    flows: PathBuf,

    #[arg(long)]
    out_dir: Option<PathBuf>,

    #[arg(long)]
    force: bool,
}

#[derive(Args)]
#[command(about = "Re-resolve the snapshot files on an interval until interrupted")]
struct WatchArgs {
    #[arg(long)]
    topology: PathBuf,

    #[arg(long)]
    flows: PathBuf,

    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 2000)]
    interval_ms: u64,
}

#[derive(Serialize)]
struct RunArgsSummary {
    topology: PathBuf,
    flows: PathBuf,
    out_dir: PathBuf,
    force: bool,
}

#[derive(Serialize)]
struct RunOutputs {
    resolved: PathBuf,
    run: PathBuf,
}

#[derive(Serialize)]
struct HostInfo {
    os: String,
    arch: String,
}

#[derive(Serialize)]
struct RunReceipt {
    version: String,
    started_at_utc: String,
    finished_at_utc: String,
    args: RunArgsSummary,
    outputs: RunOutputs,
    host: HostInfo,
    summary: CycleSummary,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve(args) => run_resolve(args),
        Commands::Run(args) => run_run(args),
        Commands::Watch(args) => run_watch(args),
    }
}

fn run_resolve(args: ResolveArgs) -> Result<()> {
    let resolved = cycle_once(&args.topology, &args.flows)?;
    report_cycle(&resolved);
    write_json(&args.out, &resolved)
}

fn run_run(args: RunArgs) -> Result<()> {
    let started_at_utc = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let out_dir = args.out_dir.clone().unwrap_or_else(default_out_dir);

    if out_dir.exists() {
        if !out_dir.is_dir() {
            return Err(anyhow!(
                "output path {:?} exists and is not a directory",
                out_dir
            ));
        }
        if !args.force {
            return Err(anyhow!(
                "output directory {:?} already exists (use --force)",
                out_dir
            ));
        }
    } else {
        fs::create_dir_all(&out_dir)
            .map_err(|err| anyhow!("failed to create output directory {:?}: {}", out_dir, err))?;
    }

    let resolved_path = out_dir.join("resolved.json");
    let run_path = out_dir.join("run.json");

    let resolved = cycle_once(&args.topology, &args.flows)?;
    report_cycle(&resolved);
    write_json(&resolved_path, &resolved)?;

    let finished_at_utc = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let receipt = RunReceipt {
        version: env!("CARGO_PKG_VERSION").to_string(),
        started_at_utc,
        finished_at_utc,
        args: RunArgsSummary {
            topology: args.topology,
            flows: args.flows,
            out_dir,
            force: args.force,
        },
        outputs: RunOutputs {
            resolved: resolved_path,
            run: run_path.clone(),
        },
        host: HostInfo {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        },
        summary: resolved.summary.clone(),
    };

    write_json(&run_path, &receipt)
}

fn run_watch(args: WatchArgs) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))
        .map_err(|err| anyhow!("failed to install ctrl-c handler: {err}"))?;

    // cycles run to completion on this thread; a tick with unreadable
    // snapshots is reported and skipped, never fatal
    while running.load(Ordering::SeqCst) {
        match cycle_once(&args.topology, &args.flows) {
            Ok(resolved) => {
                report_cycle(&resolved);
                write_json(&args.out, &resolved)?;
            }
            Err(err) => eprintln!("watch: skipping cycle: {err}"),
        }

        let mut remaining = args.interval_ms;
        while remaining > 0 && running.load(Ordering::SeqCst) {
            let slice = remaining.min(100);
            sleep(Duration::from_millis(slice));
            remaining -= slice;
        }
    }

    eprintln!("watch: stopped");
    Ok(())
}

fn cycle_once(topology_path: &PathBuf, flows_path: &PathBuf) -> Result<ResolvedFile> {
    let contents = fs::read_to_string(topology_path)
        .map_err(|err| anyhow!("failed to read topology {:?}: {}", topology_path, err))?;
    let topology: TopologySnapshot = serde_json::from_str(&contents)
        .map_err(|err| anyhow!("failed to parse topology {:?}: {}", topology_path, err))?;

    let contents = fs::read_to_string(flows_path)
        .map_err(|err| anyhow!("failed to read flows {:?}: {}", flows_path, err))?;
    let flows: Vec<FlowRecord> = serde_json::from_str(&contents)
        .map_err(|err| anyhow!("failed to parse flows {:?}: {}", flows_path, err))?;

    Ok(run_cycle(&topology, &flows))
}

fn report_cycle(resolved: &ResolvedFile) {
    let summary = &resolved.summary;
    eprintln!(
        "cycle: {} flows, {}/{} segments matched ({:.1}% coverage), {} unresolved steps",
        summary.flows,
        summary.matched_segments,
        summary.total_segments,
        summary.coverage * 100.0,
        summary.unresolved_steps
    );
    if summary.duplicate_ips > 0 {
        eprintln!(
            "warning: {} duplicate IP registrations in topology snapshot",
            summary.duplicate_ips
        );
    }
}

fn default_out_dir() -> PathBuf {
    let stamp = Utc::now().format("%Y%m%d-%H%M%S").to_string();
    PathBuf::from("output").join(stamp)
}

fn write_json<T: Serialize>(path: &PathBuf, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value)?;
    atomic_write(path, &json)
}

fn atomic_write(path: &PathBuf, data: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| std::path::Path::new("."));
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)
            .map_err(|err| anyhow!("failed to create output directory {:?}: {}", parent, err))?;
    }

    let tmp_path = temp_path(path);
    let mut file = fs::File::create(&tmp_path)
        .map_err(|err| anyhow!("failed to create temp file {:?}: {}", tmp_path, err))?;
    file.write_all(data)
        .map_err(|err| anyhow!("failed to write temp file {:?}: {}", tmp_path, err))?;
    file.sync_all()
        .map_err(|err| anyhow!("failed to sync temp file {:?}: {}", tmp_path, err))?;

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(anyhow!("failed to replace output {:?}: {}", path, err));
    }

    if let Ok(dir) = fs::File::open(parent) {
        let _ = dir.sync_all();
    }

    Ok(())
}

fn temp_path(path: &PathBuf) -> PathBuf {
    let parent = path.parent().unwrap_or_else(|| std::path::Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("output");
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let pid = std::process::id();
    let tmp_name = format!(".{}.part-{}-{}", file_name, pid, stamp);
    parent.join(tmp_name)
}
