mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{EXIT_BAD_INPUT, EXIT_FAILURE, EXIT_STORE_ERROR};
use std::path::PathBuf;
use std::process::ExitCode;
use suitestore_core::Installer;

#[derive(Debug, Parser)]
#[command(
    name = "suitestore",
    version,
    about = "Transactional MIDlet suite installation and storage"
)]
struct Cli {
    /// Path to the suite store directory.
    #[arg(long, default_value = "~/.local/share/suitestore", global = true)]
    store: String,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Install a suite (or a dynamic component) from a jar file.
    Install {
        /// Jar to install. It is copied into the store.
        jar: PathBuf,
        /// Application descriptor (JAD) of the suite.
        #[arg(long)]
        jad: Option<PathBuf>,
        /// Manifest text of the jar, in `Key: Value` form.
        #[arg(long)]
        manifest: Option<PathBuf>,
        /// URL the JAD was downloaded from.
        #[arg(long)]
        jad_url: Option<String>,
        /// URL the jar was downloaded from (defaults to MIDlet-Jar-URL or the jar path).
        #[arg(long)]
        jar_url: Option<String>,
        /// Protection domain to bind the suite to.
        #[arg(long, default_value = "untrusted")]
        domain: String,
        /// Mark the suite as trusted.
        #[arg(long, default_value_t = false)]
        trusted: bool,
        /// Certificate authority of the signer; repeat for a chain, most trusted first.
        #[arg(long = "ca")]
        auth_path: Vec<String>,
        /// Storage volume to keep the jar on.
        #[arg(long, default_value_t = 0)]
        storage: i32,
        /// Suite id to install under (reinstalls when it exists). Allocated when omitted.
        #[arg(long)]
        suite_id: Option<i32>,
        /// Install as a dynamic component of this suite.
        #[arg(long)]
        component_of: Option<i32>,
        /// Display name (defaults to MIDlet-Name).
        #[arg(long)]
        name: Option<String>,
        /// Directory with the suite's unpacked resources, used for the image and icon caches.
        #[arg(long)]
        resources: Option<PathBuf>,
    },
    /// Remove an installed suite and its components.
    Remove {
        /// Suite id, or component id with --component.
        id: i32,
        /// Remove a single dynamic component.
        #[arg(long, default_value_t = false)]
        component: bool,
    },
    /// List installed suites and components.
    List,
    /// Show the stored record, provenance and settings of a suite.
    Info {
        /// Suite id.
        suite_id: i32,
    },
    /// Allocate a fresh id.
    CreateId {
        /// Allocate a component id instead of a suite id.
        #[arg(long, default_value_t = false)]
        component: bool,
    },
    /// Enable a suite.
    Enable {
        /// Suite id.
        suite_id: i32,
    },
    /// Disable a suite.
    Disable {
        /// Suite id.
        suite_id: i32,
    },
    /// Verify store integrity.
    VerifyStore,
    /// Roll back operations interrupted by a crash.
    Recover,
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("SUITESTORE_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .init();

    let json_output = cli.json;
    let result = match cli.command {
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
        command => {
            let store_path = expand_tilde(&cli.store);
            match Installer::open(&store_path) {
                Ok(mut installer) => dispatch(&mut installer, command, json_output),
                Err(e) => Err(e.to_string()),
            }
        }
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::from(exit_code_for(&msg))
        }
    }
}

fn dispatch(installer: &mut Installer, command: Commands, json: bool) -> Result<u8, String> {
    match command {
        Commands::Install {
            jar,
            jad,
            manifest,
            jad_url,
            jar_url,
            domain,
            trusted,
            auth_path,
            storage,
            suite_id,
            component_of,
            name,
            resources,
        } => commands::install::run(
            installer,
            &commands::install::InstallArgs {
                jar,
                jad,
                manifest,
                jad_url,
                jar_url,
                domain,
                trusted,
                auth_path,
                storage,
                suite_id,
                component_of,
                name,
                resources,
            },
            json,
        ),
        Commands::Remove { id, component } => commands::remove::run(installer, id, component, json),
        Commands::List => commands::list::run(installer, json),
        Commands::Info { suite_id } => commands::info::run(installer, suite_id, json),
        Commands::CreateId { component } => commands::create_id::run(installer, component, json),
        Commands::Enable { suite_id } => commands::enable::run(installer, suite_id, true, json),
        Commands::Disable { suite_id } => commands::enable::run(installer, suite_id, false, json),
        Commands::VerifyStore => commands::verify_store::run(installer, json),
        Commands::Recover => commands::recover::run(installer, json),
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
    }
}

fn exit_code_for(msg: &str) -> u8 {
    if msg.starts_with("invalid parameters:")
        || msg.starts_with("invalid input:")
        || msg.starts_with("schema error:")
    {
        EXIT_BAD_INPUT
    } else if msg.starts_with("store error:") || msg.starts_with("store lock:") {
        EXIT_STORE_ERROR
    } else {
        EXIT_FAILURE
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(stripped);
        }
    }
    PathBuf::from(path)
}
