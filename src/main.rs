use clap::Parser;
use test_demux::cli::commands::{
    build_tracer, cmd_broadcast, cmd_devices, cmd_dump, cmd_locate, cmd_occluded, cmd_visible,
};
use test_demux::cli::config::{Cli, Commands, load_config};
use test_demux::console::command::{DeviceCommand, ScaledPoint};
use test_demux::tree::identity::UniqueId;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging(verbose: u8) {
    // RUST_LOG wins over -v
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref());
    let tracer = build_tracer(&config, cli.trace.as_deref());
    let tracer = tracer.as_ref();

    let ok = match cli.command {
        Commands::Devices => {
            cmd_devices(&config.adb)?;
            true
        }
        Commands::Dump { serial, file } => {
            cmd_dump(&config, serial.as_deref(), file.as_deref())?;
            true
        }
        Commands::Locate { serial, x, y } => cmd_locate(&config, serial.as_deref(), x, y)?,
        Commands::Occluded { serial, id } => cmd_occluded(&config, serial.as_deref(), &id)?,
        Commands::Visible { serial, id } => {
            cmd_visible(&config, serial.as_deref(), &id, tracer)?
        }
        Commands::Tap { targets, x, y, id } => {
            let widget: Option<UniqueId> = id.map(|id| id.parse()).transpose()?;
            cmd_broadcast(&config, &targets, DeviceCommand::tap(x, y, widget), tracer)?
        }
        Commands::Drag {
            targets,
            from_x,
            from_y,
            to_x,
            to_y,
            duration_ms,
        } => {
            let command = DeviceCommand::Drag {
                from: ScaledPoint::new(from_x, from_y),
                to: ScaledPoint::new(to_x, to_y),
                duration_ms,
            };
            cmd_broadcast(&config, &targets, command, tracer)?
        }
        Commands::Key { targets, keycode } => {
            cmd_broadcast(&config, &targets, DeviceCommand::Key { keycode }, tracer)?
        }
        Commands::Text { targets, text } => {
            cmd_broadcast(&config, &targets, DeviceCommand::Text { text }, tracer)?
        }
        Commands::Shell { targets, command } => {
            cmd_broadcast(&config, &targets, DeviceCommand::Shell { command }, tracer)?
        }
        Commands::Start { targets, intent } => {
            let command = DeviceCommand::StartActivity {
                intent: intent.into(),
            };
            cmd_broadcast(&config, &targets, command, tracer)?
        }
        Commands::Restart { targets } => {
            cmd_broadcast(&config, &targets, DeviceCommand::Restart, tracer)?
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
