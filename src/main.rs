use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dist_stamp::config;
use dist_stamp::context::CommandContext;
use dist_stamp::pipeline::Pipeline;
use dist_stamp::platform::PlatformProfile;
use dist_stamp::stamper::{InterpreterProbe, PostInstallStamper};
use dist_stamp::ui;
use dist_stamp::version::ResolvedVersion;

#[derive(Parser)]
#[command(
    name = "dist-stamp",
    about = "Resolve distribution versions and generate packaging manifests",
    version
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(
        short = 'C',
        long,
        global = true,
        default_value = ".",
        help = "Project root containing the checkout and metadata file"
    )]
    root: PathBuf,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase log verbosity")]
    verbose: u8,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print the resolved version for a host command
    Version {
        #[arg(last = true, help = "Host command arguments, script first")]
        args: Vec<String>,
    },

    /// Generate the manifest for a host command
    Manifest {
        #[arg(long, help = "Target platform (windows or unix), defaults to the host")]
        platform: Option<PlatformProfile>,

        #[arg(last = true, help = "Host command arguments, script first")]
        args: Vec<String>,
    },

    /// Stamp the installed metadata file after an install
    Stamp {
        #[arg(long, help = "Resolved version to write")]
        resolved: String,

        #[arg(long, help = "Interpreter used to locate the installed package")]
        python: Option<PathBuf>,

        #[arg(last = true, help = "Host command arguments, script first")]
        args: Vec<String>,
    },

    /// Resolve, write the manifest, run the host command and stamp the install
    Run {
        #[arg(long, help = "Host packaging program, e.g. python")]
        exec: String,

        #[arg(long, help = "Interpreter used to locate the installed package")]
        python: Option<PathBuf>,

        #[arg(long, help = "Target platform (windows or unix), defaults to the host")]
        platform: Option<PlatformProfile>,

        #[arg(last = true, help = "Host command arguments, script first")]
        args: Vec<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the selected command and returns the process exit code.
fn run(args: Args) -> Result<i32> {
    let mut config = config::load_config(args.config.as_deref(), &args.root)?;

    match args.command {
        Cmd::Version { args: host_args } => {
            let pipeline = Pipeline::new(config, &args.root, host_args, PlatformProfile::detect());
            let version = pipeline.version()?;
            if let Some(warning) = pipeline.version_warning()? {
                ui::display_warning(&warning);
            }
            println!("{}", version);
        }

        Cmd::Manifest {
            platform,
            args: host_args,
        } => {
            let profile = platform.unwrap_or_else(PlatformProfile::detect);
            let pipeline = Pipeline::new(config, &args.root, host_args, profile);
            let path = pipeline.manifest_path();
            match pipeline.write_manifest()? {
                Some(rules) => {
                    ui::display_manifest(&path.display().to_string(), &rules);
                    ui::display_success(&format!("Wrote {} for {}", path.display(), profile));
                }
                None => ui::display_status(&format!(
                    "No distribution requested, {} left untouched",
                    path.display()
                )),
            }
        }

        Cmd::Stamp {
            resolved,
            python,
            args: host_args,
        } => {
            if let Some(python) = python {
                config.stamp.python = python;
            }
            let probe = InterpreterProbe::from_config(&config.stamp);
            let stamper = PostInstallStamper::new(&config.project, &args.root, &probe);
            let context = CommandContext::from_args(&host_args);
            let outcome = stamper.stamp(&ResolvedVersion::from_resolved(resolved), &context);
            ui::display_stamp_outcome(&outcome);
        }

        Cmd::Run {
            exec,
            python,
            platform,
            args: host_args,
        } => {
            if let Some(python) = python {
                config.stamp.python = python;
            }
            let probe = InterpreterProbe::from_config(&config.stamp);
            let profile = platform.unwrap_or_else(PlatformProfile::detect);
            let pipeline = Pipeline::new(config, &args.root, host_args, profile);

            let report = pipeline.run(&exec, &probe)?;
            for warning in &report.warnings {
                ui::display_warning(warning);
            }
            if let Some(outcome) = &report.stamp {
                ui::display_stamp_outcome(outcome);
            }

            if !report.succeeded() {
                ui::display_error(&format!("{} exited with {}", exec, report.host_status));
                return Ok(report.host_status.code().unwrap_or(1));
            }
            ui::display_success(&format!("Built version {}", report.version));
        }
    }

    Ok(0)
}
