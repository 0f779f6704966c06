use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

const LONG_ABOUT: &str = r#"pixelbot drives a game UI by repeatedly capturing the screen, matching
template images against it, and clicking what it recognizes.

WORKFLOW:
    1. Describe the screens and buttons as a task graph in tasks.json
    2. Describe the emulator (adb endpoint, surface size) in pixelbot.json
    3. Validate with 'pixelbot check' and inspect with 'pixelbot graph'
    4. Start the loop with 'pixelbot run'
    5. Interrupt with Ctrl-C; the current action finishes before shutdown

EXAMPLES:
    pixelbot check
    pixelbot graph --start start_button
    pixelbot run --profile mumu --start start_button
    pixelbot run --profile mumu --start start_button --templates assets/1280x720"#;

#[derive(Parser)]
#[command(name = "pixelbot")]
#[command(author, version)]
#[command(about = "Task-graph UI automation for emulator-hosted games")]
#[command(long_about = LONG_ABOUT)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Task graph definition file
    #[arg(short, long, global = true, default_value = "tasks.json")]
    pub tasks: PathBuf,

    /// Runtime options and device profiles file
    #[arg(short, long, global = true, env = "PIXELBOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (also respects RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate the task graph and configuration without touching a device
    Check,

    /// Print the task graph's edges, optionally restricted to what is
    /// reachable from a start task
    Graph {
        /// Only show tasks reachable from this one
        #[arg(short, long)]
        start: Option<String>,
    },

    /// Run the automation loop against a configured device profile
    Run {
        /// Device profile name from the configuration file
        #[arg(short, long)]
        profile: String,

        /// Task to start the loop from
        #[arg(short, long)]
        start: String,

        /// Directory holding the template images referenced by tasks
        #[arg(long, default_value = "templates")]
        templates: PathBuf,

        /// Directory screenshots are written to
        #[arg(long, default_value = "screenshots")]
        screenshots: PathBuf,

        /// Consecutive recognition misses tolerated before giving up
        #[arg(long, default_value = "120")]
        max_no_match: u32,

        /// Retries for transient capture/click failures within one cycle
        #[arg(long, default_value = "3")]
        max_retries: u32,

        /// Fix the random seed used for click jitter (for reproducing runs)
        #[arg(long)]
        seed: Option<u64>,
    },
}
