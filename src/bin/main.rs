extern crate ray_diagram as root;

use root::controls::{Command, ControlPanel};
use root::diagram::RayDiagram;
use root::optics::OpticalType;
use root::parsing::get_config;
use root::surface::Surface;

#[macro_use]
extern crate log;
extern crate simplelog;

use log::LevelFilter;
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use simplelog::{ColorChoice, CombinedLogger, TermLogger, TerminalMode, WriteLogger};
use structopt::StructOpt;

use std::fs::File;
use std::path::PathBuf;

#[derive(Debug, StructOpt)]
#[structopt(rename_all = "kebab-case")]
struct Opt {
    #[structopt(long, default_value = "data/config.toml")]
    pub config_file: String,
    /// overrides the object image from the config file
    #[structopt(long)]
    pub object_image: Option<PathBuf>,
    #[structopt(short = "pll", long, default_value = "warn")]
    pub print_log_level: String,
    #[structopt(short = "wll", long, default_value = "info")]
    pub write_log_level: String,
}

fn parse_log_level(level: String, default: LevelFilter) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "trace" => LevelFilter::Trace,
        "error" => LevelFilter::Error,
        "debug" => LevelFilter::Debug,
        _ => default,
    }
}

fn key_commands(window: &Window) -> Vec<Command> {
    let mut commands = Vec::new();
    for key in window.get_keys_pressed(KeyRepeat::Yes) {
        match key {
            Key::Key1 => commands.push(Command::SelectOptical(OpticalType::ConvergingLens)),
            Key::Key2 => commands.push(Command::SelectOptical(OpticalType::DivergingLens)),
            Key::Key3 => commands.push(Command::SelectOptical(OpticalType::ConvergingMirror)),
            Key::Key4 => commands.push(Command::SelectOptical(OpticalType::DivergingMirror)),
            Key::Left => commands.push(Command::NudgeObjectDistance(-1)),
            Key::Right => commands.push(Command::NudgeObjectDistance(1)),
            Key::Down => commands.push(Command::NudgeFocalLength(-1)),
            Key::Up => commands.push(Command::NudgeFocalLength(1)),
            Key::Minus => commands.push(Command::NudgeObjectSize(-1)),
            Key::Equal => commands.push(Command::NudgeObjectSize(1)),
            _ => {}
        }
    }
    commands
}

fn main() {
    let opts = Opt::from_args();
    let term_log_level = parse_log_level(opts.print_log_level, LevelFilter::Warn);
    let write_log_level = parse_log_level(opts.write_log_level, LevelFilter::Info);

    CombinedLogger::init(vec![
        TermLogger::new(
            term_log_level,
            simplelog::Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(
            write_log_level,
            simplelog::Config::default(),
            File::create("main.log").unwrap(),
        ),
    ])
    .unwrap();

    let config = match get_config(&opts.config_file) {
        Ok(config) => config,
        Err(e) => {
            error!("couldn't read config, {:?}", e);
            return;
        }
    };

    let (width, height) = (config.resolution.width, config.resolution.height);

    let mut diagram = match RayDiagram::new(&config.asset_dir, config.optical) {
        Ok(diagram) => diagram,
        Err(e) => {
            error!("fatal: {:?}", e);
            return;
        }
    };

    let mut panel = ControlPanel::new(
        config.object_distance,
        config.focal_length,
        config.object_size,
    );
    panel.push(&mut diagram);

    if let Some(path) = opts.object_image.or(config.object_image) {
        diagram.set_object_path(path);
    }

    let mut surface = Surface::new(width, height);
    let mut buffer = vec![0u32; width * height];

    let mut window = Window::new("Ray Diagram", width, height, WindowOptions::default())
        .unwrap_or_else(|e| {
            panic!("{}", e);
        });
    window.set_target_fps(60);

    info!("starting render loop at {}x{}", width, height);
    while window.is_open() && !window.is_key_down(Key::Escape) {
        for command in key_commands(&window) {
            if let Err(e) = panel.apply(command, &mut diagram) {
                error!("fatal: {:?}", e);
                return;
            }
        }

        diagram.render(&mut surface);
        panel.refresh(&diagram);
        window.set_title(&format!(
            "Ray Diagram | {:?} | A={} F={} size={} | B={} image={}",
            diagram.optical(),
            panel.a,
            panel.f,
            panel.object_size,
            panel.b,
            panel.image_size
        ));

        surface.present_into(&mut buffer);
        window
            .update_with_buffer(&buffer, width, height)
            .unwrap_or_else(|e| {
                panic!("{}", e);
            });
    }
}
