//! Subcommand handlers.

use std::collections::BTreeSet;
use std::collections::VecDeque;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use pixelbot_common::RealSleeper;
use pixelbot_common::Sleeper;
use pixelbot_core::TaskRegistry;
use pixelbot_device::{AdbTransport, HandleKind, HandleResolver, HandleSpec, NativeHandle,
    SurfaceTarget, WindowEnumerator};
use pixelbot_engine::{Collaborators, EngineError, RetryPolicy, Scheduler, StopReason};
use tracing::{info, warn};

use crate::backends::{AdbCapture, AdbInput, FileSink, PixelComparer, PixelMatcher, TemplateStore};
use crate::commands::{Cli, Commands};
use crate::config::{self, AppConfig};
use crate::error::CliError;

pub fn dispatch(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        Commands::Check => check(&cli.tasks, cli.config.as_deref()),
        Commands::Graph { start } => graph(&cli.tasks, start.as_deref()),
        Commands::Run {
            profile,
            start,
            templates,
            screenshots,
            max_no_match,
            max_retries,
            seed,
        } => run(
            &cli.tasks,
            cli.config
                .clone()
                .unwrap_or_else(|| PathBuf::from("pixelbot.json")),
            RunArgs {
                profile: profile.clone(),
                start: start.clone(),
                templates: templates.clone(),
                screenshots: screenshots.clone(),
                max_no_match: *max_no_match,
                max_retries: *max_retries,
                seed: *seed,
            },
        ),
    }
}

pub fn check(tasks_path: &Path, config_path: Option<&Path>) -> Result<(), CliError> {
    let registry = config::load_tasks(tasks_path)?;
    println!(
        "{} tasks validated (including the built-in 'stop').",
        registry.len()
    );
    if let Some(path) = config_path {
        let app = AppConfig::load(path)?;
        println!("{} device profiles; runtime options ok.", app.profiles.len());
        for name in app.profiles.keys() {
            println!("  profile: {name}");
        }
    }
    Ok(())
}

pub fn graph(tasks_path: &Path, start: Option<&str>) -> Result<(), CliError> {
    let registry = config::load_tasks(tasks_path)?;
    let names: Vec<String> = match start {
        Some(start) => reachable(&registry, start)?,
        None => registry.names().map(str::to_string).collect(),
    };
    for name in &names {
        let task = registry.lookup(name).map_err(EngineError::from)?;
        for next in &task.next {
            println!("{name} -> {next}");
        }
        for next in &task.exceeded_next {
            println!("{name} -> {next} [exceeded]");
        }
        for target in &task.decrement_on_execute {
            println!("{name} -| {target} [decrement]");
        }
        if task.next.is_empty() && task.exceeded_next.is_empty() {
            println!("{name} [terminal]");
        }
    }
    Ok(())
}

fn reachable(registry: &TaskRegistry, start: &str) -> Result<Vec<String>, CliError> {
    registry.lookup(start).map_err(EngineError::from)?;
    let mut seen = BTreeSet::new();
    let mut order = Vec::new();
    let mut queue = VecDeque::from([start.to_string()]);
    while let Some(name) = queue.pop_front() {
        if !seen.insert(name.clone()) {
            continue;
        }
        let task = registry.lookup(&name).map_err(EngineError::from)?;
        for next in task.next.iter().chain(&task.exceeded_next) {
            queue.push_back(next.clone());
        }
        order.push(name);
    }
    Ok(order)
}

pub struct RunArgs {
    pub profile: String,
    pub start: String,
    pub templates: PathBuf,
    pub screenshots: PathBuf,
    pub max_no_match: u32,
    pub max_retries: u32,
    pub seed: Option<u64>,
}

/// Window enumerator for the reference binary: native window lookup is a
/// platform integration this build does not carry, so it finds nothing and
/// only ADB profiles resolve.
struct NoWindows;

impl WindowEnumerator for NoWindows {
    fn find(&self, _spec: &HandleSpec) -> Option<NativeHandle> {
        None
    }
}

pub fn run(tasks_path: &Path, config_path: PathBuf, args: RunArgs) -> Result<(), CliError> {
    let registry = Arc::new(config::load_tasks(tasks_path)?);
    let app = AppConfig::load(&config_path)?;
    let profile = app.profile(&args.profile)?;
    if profile.adb.is_none() {
        return Err(CliError::NativeUnsupported(profile.name.clone()));
    }

    let surface = HandleResolver::new(profile, &NoWindows).resolve(HandleKind::Control)?;
    let endpoint = match surface.target() {
        SurfaceTarget::Adb(endpoint) => endpoint.clone(),
        SurfaceTarget::Native(_) => {
            return Err(CliError::NativeUnsupported(profile.name.clone()));
        }
    };

    let transport = AdbTransport::new(endpoint.clone());
    transport.connect()?;
    let surface = match transport.display_size() {
        Ok((width, height)) => {
            let (nominal_width, nominal_height) = endpoint.nominal_display();
            if (width, height) != (nominal_width, nominal_height) {
                info!(
                    width,
                    height, nominal_width, nominal_height, "correcting coordinate scale"
                );
            }
            surface.with_scale(endpoint.scale_for(width))
        }
        Err(e) => {
            warn!(%e, "display size query failed, assuming the profile's nominal size");
            surface
        }
    };

    let store = TemplateStore::new(args.templates.clone());
    let collaborators = Collaborators {
        capture: Box::new(AdbCapture::new(AdbTransport::new(endpoint))),
        matcher: Box::new(PixelMatcher::new(Arc::clone(&store))),
        comparer: Box::new(PixelComparer::new(store)),
        controller: Box::new(AdbInput::new(transport)),
        sink: Box::new(FileSink::new(args.screenshots.clone())),
    };
    let policy = RetryPolicy {
        max_transient_retries: args.max_retries,
        max_no_match_attempts: args.max_no_match,
        ..Default::default()
    };

    let mut scheduler = Scheduler::new(
        registry,
        surface,
        collaborators,
        app.options,
        policy,
        Arc::new(RealSleeper) as Arc<dyn Sleeper>,
    );
    if let Some(seed) = args.seed {
        scheduler = scheduler.with_rng_seed(seed);
    }
    if let Err(e) = register_stop(&scheduler.stop_flag()) {
        warn!(%e, "could not register signal handlers; Ctrl-C will not stop cleanly");
    }

    let summary = scheduler.run(&args.start)?;
    match summary.reason {
        StopReason::StopTask(name) => println!(
            "Run finished at '{name}' after {} cycles ({} task executions).",
            summary.cycles, summary.executions
        ),
        StopReason::Aborted => println!(
            "Run aborted after {} cycles ({} task executions).",
            summary.cycles, summary.executions
        ),
    }
    Ok(())
}

#[cfg(unix)]
fn register_stop(flag: &Arc<AtomicBool>) -> std::io::Result<()> {
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(flag))?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(flag))?;
    Ok(())
}

#[cfg(not(unix))]
fn register_stop(_flag: &Arc<AtomicBool>) -> std::io::Result<()> {
    Ok(())
}
