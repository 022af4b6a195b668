use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use image::GenericImageView;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use keepsake::{SavedState, StateHolder, StateHolderConfig};

/// Each invocation of this binary is one hosted session. The snapshot JSON
/// written on exit plays the part of the host's saved-state record, so
/// running the demo twice in a row shows state surviving process death.
#[derive(Parser, Debug)]
#[command(name = "keepsake", about = "Saved-state survival demo")]
struct Args {
    /// Where the host parks the snapshot between runs
    #[arg(short, long, value_name = "FILE")]
    state_file: Option<PathBuf>,

    /// Number of randomize triggers to fire this session
    #[arg(short, long, value_name = "N", default_value_t = 1)]
    clicks: u32,

    /// Behave as if the saved-state mechanism is switched off
    #[arg(long)]
    no_persist: bool,

    /// End the session permanently: no snapshot is written
    #[arg(long)]
    quit_without_saving: bool,
}

fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();

    if let Err(err) = run_session(args) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run_session(args: Args) -> keepsake::Result<()> {
    let config = StateHolderConfig {
        persist_across_recreation: !args.no_persist,
        ..StateHolderConfig::default()
    };
    let state_file = args
        .state_file
        .unwrap_or_else(|| config.cache_dir.join("saved_state.json"));

    let restored = load_saved_state(&state_file);
    let mut holder = StateHolder::new(config, restored.as_ref());
    report("session started", &holder);

    for _ in 0..args.clicks {
        holder.randomize();
        report("clicked", &holder);
    }

    if args.quit_without_saving {
        info!("Session ended permanently; nothing saved");
        return Ok(());
    }

    let snapshot = holder.on_snapshot_requested();
    if let Some(parent) = state_file.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&state_file, snapshot.to_json()?)?;
    info!(file = %state_file.display(), "Snapshot written; run again to restore it");
    Ok(())
}

/// The restoration hint is single-use, like the image file behind it: the
/// state file is removed as soon as it has been read.
fn load_saved_state(path: &Path) -> Option<SavedState> {
    let data = fs::read(path).ok()?;
    let _ = fs::remove_file(path);

    match SavedState::from_json(&data) {
        Ok(state) => Some(state),
        Err(err) => {
            warn!(file = %path.display(), error = %err, "Ignoring unreadable saved state");
            None
        }
    }
}

fn report(event: &str, holder: &StateHolder) {
    let image = match holder.image() {
        Some(image) => {
            let (width, height) = image.dimensions();
            format!("{width}x{height}")
        }
        None => "none".to_string(),
    };
    info!(event, text = holder.text(), image, "State");
}
