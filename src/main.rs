//! syncframe demo entry point.
//!
//! Runs a headless frame loop over the four demo widgets while simulated
//! collaborators work on their own threads:
//! - a drive probe polled by the storage list's drive monitor,
//! - a directory scanner publishing scan events and delivering the tree,
//! - a preset parser publishing loaded/failed events,
//! - an audio decoder filling the metadata cache on request.
//!
//! None of the workers touch entity state; they only call `send_update` and
//! publish on the bus.
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --frames 240 --dump-state
//! ```

use clap::Parser;
use crossbeam_channel::Receiver;
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use syncframe::components::command::{Command, TypeTag};
use syncframe::components::entityid::EntityId;
use syncframe::components::geometry::Vec2;
use syncframe::components::interaction::MouseButton;
use syncframe::components::payload::{AudioMeta, Payload, Preset, StorageLocation, TreeNode};
use syncframe::events::preset::PresetEvent;
use syncframe::widgets::Widget;
use syncframe::events::scan::ScanEvent;
use syncframe::resources::context::AppContext;
use syncframe::resources::eventbus::EventBus;
use syncframe::resources::metadata::MetadataCache;
use syncframe::resources::syncconfig::SyncConfig;
use syncframe::systems::frame::FrameLoop;
use syncframe::systems::interaction::HitSample;
use syncframe::systems::monitor::PeriodicMonitor;
use syncframe::systems::queue::CommandSender;
use syncframe::widgets::button::Button;
use syncframe::widgets::library::LibraryTree;
use syncframe::widgets::presets::PresetList;
use syncframe::widgets::storage::{self, StorageList};

const LIBRARY_ROOT: &str = "/samples";

#[derive(Parser)]
#[command(version, about = "Headless demo of the syncframe state-sync substrate")]
struct Cli {
    /// INI configuration file (default: ./syncframe.ini).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of frames to run.
    #[arg(long, default_value_t = 180)]
    frames: u64,

    /// Print a JSON snapshot of every widget after the last frame.
    #[arg(long)]
    dump_state: bool,

    /// Write the effective configuration back to the config file and exit.
    #[arg(long)]
    save_config: bool,
}

fn probe_drives() -> Vec<StorageLocation> {
    let mut locations = vec![StorageLocation {
        name: "Samples".into(),
        mount: LIBRARY_ROOT.into(),
        removable: false,
    }];
    if fastrand::bool() {
        locations.push(StorageLocation {
            name: "USB".into(),
            mount: "/media/usb".into(),
            removable: true,
        });
    }
    locations
}

fn sample_tree(files: usize) -> TreeNode {
    let kicks = (0..files / 2)
        .map(|i| TreeNode::file(format!("kick_{:02}.wav", i), format!("{}/kicks/kick_{:02}.wav", LIBRARY_ROOT, i)))
        .collect();
    let snares = (0..files - files / 2)
        .map(|i| TreeNode::file(format!("snare_{:02}.wav", i), format!("{}/snares/snare_{:02}.wav", LIBRARY_ROOT, i)))
        .collect();
    TreeNode::dir(
        "samples",
        LIBRARY_ROOT,
        vec![
            TreeNode::dir("kicks", format!("{}/kicks", LIBRARY_ROOT), kicks),
            TreeNode::dir("snares", format!("{}/snares", LIBRARY_ROOT), snares),
        ],
    )
}

/// Walks a fake library in steps, one step per tick, after a short delay
/// that lets the storage selection re-root the library first.
fn spawn_scanner(bus: Arc<EventBus>, library: CommandSender) -> std::io::Result<PeriodicMonitor> {
    let total = 8 + fastrand::usize(..8);
    let mut ticks = 0;
    let mut found = 0;
    let mut done = false;
    PeriodicMonitor::spawn("scanner", Duration::from_millis(30), move || {
        ticks += 1;
        if done || ticks < 8 {
            return;
        }
        if found == 0 {
            bus.publish(ScanEvent::started(LIBRARY_ROOT));
        }
        found = (found + 1 + fastrand::usize(..3)).min(total);
        if found < total {
            bus.publish(ScanEvent::progress(LIBRARY_ROOT, found));
            return;
        }
        library.send_update(Command::new(
            TypeTag::SetTree,
            Payload::Tree(Arc::new(sample_tree(total))),
        ));
        bus.publish(ScanEvent::completed(LIBRARY_ROOT, total));
        done = true;
    })
}

/// Parses a handful of fake presets, one per tick; the last one fails.
fn spawn_preset_parser(bus: Arc<EventBus>) -> std::io::Result<PeriodicMonitor> {
    let names = ["808 Kit", "Acoustic", "Broken"];
    let mut next = 0;
    PeriodicMonitor::spawn("preset-parser", Duration::from_millis(120), move || {
        let Some(name) = names.get(next) else {
            return;
        };
        next += 1;
        let path = PathBuf::from(format!("/presets/{}.json", name.to_lowercase().replace(' ', "_")));
        if *name == "Broken" {
            bus.publish(PresetEvent::failed(path, "unexpected end of file"));
            return;
        }
        let samples = (0..1 + fastrand::usize(..4))
            .map(|i| PathBuf::from(format!("{}/kicks/kick_{:02}.wav", LIBRARY_ROOT, i)))
            .collect();
        bus.publish(PresetEvent::loaded(Arc::new(Preset {
            name: name.to_string(),
            path,
            samples,
        })));
    })
}

/// Answers metadata requests with made-up durations.
fn spawn_decoder(cache: Arc<MetadataCache>, requests: Receiver<PathBuf>) -> std::io::Result<PeriodicMonitor> {
    PeriodicMonitor::spawn("decoder", Duration::from_millis(10), move || {
        while let Ok(path) = requests.try_recv() {
            if fastrand::u8(..20) == 0 {
                warn!("decoder: could not read {}", path.display());
                cache.fail(&path);
                continue;
            }
            let meta = AudioMeta {
                duration_secs: 0.2 + fastrand::f32() * 2.0,
                sample_rate: 44_100,
            };
            cache.insert(path, meta);
        }
    })
}

/// Scripted input: hover the button for a while and click it once.
fn scripted_hits(frame: u64, button: EntityId) -> impl FnMut(EntityId, &str) -> HitSample {
    move |id: EntityId, _name: &str| {
        if id != button || !(20..60).contains(&frame) {
            return HitSample::idle();
        }
        match frame {
            40 => HitSample::pressed(),
            41 => HitSample::hovered().with_click(MouseButton::Left),
            _ => HitSample::hovered(),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(path) => SyncConfig::with_path(path),
        None => SyncConfig::new(),
    };
    if let Err(e) = config.load_from_file() {
        warn!("{}; using defaults", e);
    }
    if cli.save_config {
        match config.save_to_file() {
            Ok(()) => println!("configuration written to {}", config.config_path.display()),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let frame_period = config.frame_period();
    let drive_poll = config.drive_poll;
    let ctx = AppContext::new(config);
    info!("syncframe demo: {} frames", cli.frames);

    let (cache, requests) = MetadataCache::new(ctx.config.channel_capacity);
    let cache = Arc::new(cache);

    let widgets = (|| -> Result<_, Box<dyn std::error::Error>> {
        let button = Button::new(&ctx, "Rescan", Vec2::new(120.0, 28.0))?;
        let storage = StorageList::new(&ctx)?.with_drive_monitor(probe_drives, drive_poll)?;
        let library = LibraryTree::new(&ctx)?;
        let presets = PresetList::new(&ctx, cache.clone())?;
        Ok((button, storage, library, presets))
    })();
    let (button, storage, library, presets) = match widgets {
        Ok(w) => w,
        Err(e) => {
            error!("failed to build widgets: {}", e);
            std::process::exit(1);
        }
    };

    let storage_tx = storage.sender();
    let workers = (|| -> std::io::Result<Vec<PeriodicMonitor>> {
        Ok(vec![
            spawn_scanner(ctx.bus.clone(), library.sender())?,
            spawn_preset_parser(ctx.bus.clone())?,
            spawn_decoder(cache.clone(), requests)?,
        ])
    })();
    let mut workers = match workers {
        Ok(w) => w,
        Err(e) => {
            error!("failed to spawn workers: {}", e);
            std::process::exit(1);
        }
    };

    let mut frames = FrameLoop::new(Vec2::new(640.0, 480.0));
    let button_id = frames.add(Box::new(button));
    frames.add(Box::new(storage));
    frames.add(Box::new(library));
    frames.add(Box::new(presets));

    let dt = frame_period.as_secs_f32();
    for frame in 0..cli.frames {
        if frame == 2 {
            storage_tx.send_update(Command::new(storage::SELECT, Payload::Index(0)));
        }
        let mut hits = scripted_hits(frame, button_id);
        frames.run_frame(dt, &mut hits);
        std::thread::sleep(frame_period);
    }

    for worker in &mut workers {
        worker.shutdown();
    }

    if cli.dump_state {
        match serde_json::to_string_pretty(&frames.snapshot()) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("failed to serialise snapshot: {}", e),
        }
    }

    let bus = ctx.bus.stats();
    info!(
        "bus: {} published, {} delivered, {} dropped; {} metadata entries",
        bus.published,
        bus.delivered,
        bus.dropped,
        cache.len()
    );
    frames.shutdown();
}
