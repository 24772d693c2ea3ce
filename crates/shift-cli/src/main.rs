use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "shift",
    about = "ShiftGrid — progressive traffic rollout planner",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the next rollout state from the desired and previous state.
    ///
    /// The desired rollout is trusted as-is. The previous annotation is
    /// validated and ignored if it is malformed or does not add up.
    Step {
        /// JSON file with the desired rollout (one revision per target)
        #[arg(short, long)]
        desired: String,
        /// File holding the previous rollout annotation value
        #[arg(short, long)]
        previous: Option<String>,
        /// Current Unix timestamp in seconds (default: system clock)
        #[arg(short, long)]
        now: Option<i64>,
        /// Path to shift.toml
        #[arg(short, long)]
        config: Option<String>,
        /// Output format: json or text
        #[arg(short, long, default_value = "json")]
        format: String,
    },
    /// Compute cadence for rollouts that just observed their first step.
    Observe {
        /// File holding the rollout annotation value
        #[arg(short, long)]
        state: String,
        /// Current Unix timestamp in seconds (default: system clock)
        #[arg(short, long)]
        now: Option<i64>,
        /// Path to shift.toml
        #[arg(short, long)]
        config: Option<String>,
        /// Output format: json or text
        #[arg(short, long, default_value = "json")]
        format: String,
    },
    /// Check a rollout annotation for inconsistencies.
    Validate {
        /// File holding the rollout annotation value
        #[arg(short, long)]
        state: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("shift=info".parse()?)
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Step { desired, previous, now, config, format } => {
            commands::plan::step(&desired, previous.as_deref(), now, config.as_deref(), &format)
        }
        Commands::Observe { state, now, config, format } => {
            commands::plan::observe(&state, now, config.as_deref(), &format)
        }
        Commands::Validate { state } => commands::validate::validate(&state),
    }
}
