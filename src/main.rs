use sdl2::keyboard::Keycode;
use skyburst::display::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use skyburst::{
    Display, InputEvent, MqttControl, PixelBuffer, RenderTarget, SfxCommand, Show, ShowCommand,
    ShowState, StartOptions, Tuning,
};
use std::time::Instant;

struct Args {
    width: u32,
    height: u32,
    vsync: bool,
    reduced_motion: bool,
    mqtt_host: Option<String>,
    mqtt_topic: String,
}

/// Parse command line arguments
fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        width: DEFAULT_WIDTH,
        height: DEFAULT_HEIGHT,
        vsync: true,
        reduced_motion: false,
        mqtt_host: None,
        mqtt_topic: MqttControl::default_topic().to_string(),
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--no-vsync" => parsed.vsync = false,
            "--reduced-motion" => parsed.reduced_motion = true,
            "--width" | "-w" => {
                if i + 1 < args.len() {
                    if let Ok(w) = args[i + 1].parse::<u32>() {
                        parsed.width = w;
                    }
                    i += 1;
                }
            },
            "--height" | "-h" => {
                if i + 1 < args.len() {
                    if let Ok(h) = args[i + 1].parse::<u32>() {
                        parsed.height = h;
                    }
                    i += 1;
                }
            },
            "--resolution" | "-r" => {
                if i + 1 < args.len() {
                    // Parse WxH format (e.g., 1920x1080)
                    let parts: Vec<&str> = args[i + 1].split('x').collect();
                    if parts.len() == 2 {
                        if let (Ok(w), Ok(h)) = (parts[0].parse::<u32>(), parts[1].parse::<u32>()) {
                            parsed.width = w;
                            parsed.height = h;
                        }
                    }
                    i += 1;
                }
            },
            "--mqtt" => {
                if i + 1 < args.len() {
                    parsed.mqtt_host = Some(args[i + 1].clone());
                    i += 1;
                }
            },
            "--topic" => {
                if i + 1 < args.len() {
                    parsed.mqtt_topic = args[i + 1].clone();
                    i += 1;
                }
            },
            "--help" => {
                println!("Usage: skyburst [OPTIONS]");
                println!();
                println!("Options:");
                println!(
                    "  --width W, -w W       Set window width (default: {})",
                    DEFAULT_WIDTH
                );
                println!(
                    "  --height H, -h H      Set window height (default: {})",
                    DEFAULT_HEIGHT
                );
                println!("  --resolution WxH, -r WxH  Set resolution (e.g., 1920x1080)");
                println!("  --no-vsync            Disable VSync for uncapped framerate");
                println!("  --reduced-motion      Honor a reduced-motion preference (show disabled)");
                println!("  --mqtt HOST           Connect to an MQTT broker for remote control");
                println!(
                    "  --topic TOPIC         MQTT control topic (default: {})",
                    MqttControl::default_topic()
                );
                println!("  --help                Show this help message");
                std::process::exit(0);
            },
            _ => {},
        }
        i += 1;
    }

    parsed
}

fn main() -> Result<(), String> {
    let args = parse_args();

    let (mut display, texture_creator) =
        Display::with_options("skyburst", args.width, args.height, args.vsync)?;
    let mut target = RenderTarget::with_size(&texture_creator, args.width, args.height)?;
    let mut buffer = PixelBuffer::with_size(args.width, args.height);

    // Tuning overrides next to the binary, if present
    let tuning = Tuning::load("tuning.json").unwrap_or_default();
    let mut show = Show::new(
        args.width as f32,
        args.height as f32,
        tuning,
        args.reduced_motion,
    );

    let control = match &args.mqtt_host {
        Some(host) => Some(MqttControl::new(host, &args.mqtt_topic)?),
        None => None,
    };

    println!("=== skyburst ===");
    println!("Resolution: {}x{}", args.width, args.height);
    if args.vsync {
        println!("VSync: ON (60fps locked). Use --no-vsync for uncapped.");
    } else {
        println!("VSync: OFF (uncapped framerate)");
    }
    println!("Use --help for command line options.");
    println!("Controls:");
    println!("  Return     - Start the show (with celebration bursts)");
    println!("  C          - Start the show quietly");
    println!("  Space      - Manual burst");
    println!("  Click      - Launch a rocket at the cursor");
    println!("  P          - Pause / resume");
    println!("  S          - Stop");
    println!("  M          - Toggle mute");
    println!("  F          - Print quality / fps readout");
    println!("  Escape     - Quit");

    show.start(StartOptions::default());

    let mut muted = false;
    let mut last_frame = Instant::now();

    'main: loop {
        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        for event in display.poll_events() {
            match event {
                InputEvent::Quit => break 'main,
                InputEvent::KeyDown(key) => match key {
                    Keycode::Escape => break 'main,
                    Keycode::Return => {
                        show.unlock_sfx();
                        show.start(StartOptions { celebrate: true });
                    },
                    Keycode::C => {
                        show.unlock_sfx();
                        show.start(StartOptions { celebrate: false });
                    },
                    Keycode::Space => show.burst(None, None),
                    Keycode::P => match show.state() {
                        ShowState::Running => show.pause(),
                        ShowState::Paused => show.resume(),
                        ShowState::Stopped => {},
                    },
                    Keycode::S => show.stop(),
                    Keycode::F => {
                        let (rockets, particles, smoke) = show.live_counts();
                        println!(
                            "quality {:.2}  fps {:.0}  rockets {}  particles {}  smoke {}",
                            show.quality(),
                            show.fps(),
                            rockets,
                            particles,
                            smoke
                        );
                    },
                    Keycode::M => {
                        muted = !muted;
                        show.set_sfx_muted(muted);
                        println!("Sound: {}", if muted { "muted" } else { "on" });
                    },
                    _ => {},
                },
                InputEvent::MouseDown { x, y } => {
                    // First gesture doubles as the audio unlock
                    show.unlock_sfx();
                    show.click(x as f32, y as f32);
                },
                // Window visibility drives pause/resume, like a hidden browser tab
                InputEvent::FocusLost | InputEvent::Hidden => show.pause(),
                InputEvent::FocusGained | InputEvent::Shown => show.resume(),
                InputEvent::Resized { width, height } => {
                    show.resize(width as f32, height as f32);
                    buffer = PixelBuffer::with_size(width, height);
                    target = RenderTarget::with_size(&texture_creator, width, height)?;
                },
            }
        }

        if let Some(control) = &control {
            for cmd in control.poll() {
                match cmd {
                    ShowCommand::Start { celebrate } => {
                        show.unlock_sfx();
                        show.start(StartOptions { celebrate });
                    },
                    ShowCommand::Stop => show.stop(),
                    ShowCommand::Pause => show.pause(),
                    ShowCommand::Resume => show.resume(),
                    ShowCommand::Burst { x, y } => show.burst(x, y),
                    ShowCommand::Mute(m) => {
                        muted = m;
                        show.set_sfx_muted(m);
                    },
                    ShowCommand::Quit => break 'main,
                }
            }
        }

        show.tick(dt);
        show.render(&mut buffer);

        // A real host would feed these to an audio mixer
        for cmd in show.drain_sfx() {
            if let SfxCommand::Play { asset, pitch } = cmd {
                eprintln!("sfx: pop {} (pitch {:.2})", asset, pitch);
            }
        }

        display.present(&mut target, &buffer)?;
    }

    Ok(())
}
