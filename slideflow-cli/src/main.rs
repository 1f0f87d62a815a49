use std::cell::RefCell;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use slideflow::{
    EnsureOptions, FixedPasswordValidator, GateKind, HeadlessHost, LayoutEngine, Millis,
    ObjectGeometry, PlaceholderRenderer, PlaybackState, Player, PlayerConfig, Position,
    Presentation, Size, UnsafeChoice, fit_viewport, plan_reveal,
};

#[derive(Parser, Debug)]
#[command(name = "slideflow", version)]
struct Cli {
    /// Log engine activity to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose one slide and print its tree as JSON.
    Layout(SlideArgs),
    /// Print the reveal plan of one slide as JSON.
    Plan(SlideArgs),
    /// Simulate playback on a virtual clock and print the event stream as JSON lines.
    Play(PlayArgs),
}

#[derive(Parser, Debug)]
struct Common {
    /// Input presentation JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Player config overrides (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Container width in px.
    #[arg(long, default_value_t = 1020.0)]
    width: f64,

    /// Container height in px.
    #[arg(long, default_value_t = 620.0)]
    height: f64,
}

#[derive(Parser, Debug)]
struct SlideArgs {
    #[command(flatten)]
    common: Common,

    /// Slide index (0-based).
    #[arg(long, default_value_t = 0)]
    slide: usize,

    /// Write to a file instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    #[command(flatten)]
    common: Common,

    /// Answer the password prompt with this value.
    #[arg(long)]
    password: Option<String>,

    /// Proceed past the unsafe-content warning instead of aborting.
    #[arg(long, default_value_t = false)]
    proceed_unsafe: bool,

    /// Force loop playback on.
    #[arg(long = "loop", default_value_t = false)]
    loop_playback: bool,

    /// Reveal every element at once.
    #[arg(long, default_value_t = false)]
    reduced_motion: bool,

    /// Stop the simulation after this many virtual milliseconds.
    #[arg(long, default_value_t = 600_000)]
    until_ms: u64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Layout(args) => cmd_layout(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Play(args) => cmd_play(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load(common: &Common) -> anyhow::Result<(Presentation, PlayerConfig)> {
    let presentation = Presentation::from_path(&common.in_path)
        .with_context(|| format!("load presentation '{}'", common.in_path.display()))?;
    let config = match &common.config {
        Some(path) => PlayerConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => PlayerConfig::default(),
    };
    Ok((presentation, config))
}

/// Compose one slide on a fresh engine and run the geometry pass.
fn compose(
    presentation: &Presentation,
    config: &PlayerConfig,
    common: &Common,
    index: usize,
) -> anyhow::Result<(LayoutEngine, i64)> {
    let slide = presentation.slides.get(index).with_context(|| {
        format!(
            "slide {index} out of range ({} slides)",
            presentation.slides.len()
        )
    })?;
    let mut engine = LayoutEngine::new(config, Box::new(PlaceholderRenderer));
    let params = fit_viewport(
        Size::new(common.width, common.height),
        config.aspect_ratio,
        config.viewport_gap_px,
    );
    engine.set_viewport(params.viewport());

    for meta in slide.meta_elements() {
        engine.ensure_element(
            &meta,
            None,
            None,
            EnsureOptions {
                draggable: false,
                always_on_top: true,
            },
        )?;
    }
    for element in &slide.elements {
        engine.ensure_element(
            element,
            None,
            None,
            EnsureOptions {
                draggable: element.position == Position::Free,
                always_on_top: false,
            },
        )?;
    }
    engine.measure(slide.id)?;
    Ok((engine, slide.id))
}

fn write_json(out: Option<&Path>, value: &impl serde::Serialize) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize output")?;
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(path, json).with_context(|| format!("write '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_layout(args: SlideArgs) -> anyhow::Result<()> {
    let (presentation, config) = load(&args.common)?;
    let (engine, slide_id) = compose(&presentation, &config, &args.common, args.slide)?;
    let snapshot = engine
        .snapshot(slide_id)
        .context("composed slide has no tree")?;
    write_json(args.out.as_deref(), &snapshot)
}

fn cmd_plan(args: SlideArgs) -> anyhow::Result<()> {
    let (presentation, config) = load(&args.common)?;
    let (engine, slide_id) = compose(&presentation, &config, &args.common, args.slide)?;
    let objects: Vec<ObjectGeometry> = engine
        .element_boxes(slide_id)
        .iter()
        .map(ObjectGeometry::from_box)
        .collect();
    let plan = plan_reveal(&objects, engine.viewport(), &config);
    write_json(args.out.as_deref(), &plan)
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let (mut presentation, config) = load(&args.common)?;
    if args.loop_playback {
        presentation.playback.loop_playback = true;
    }

    let mut host = HeadlessHost::new(Size::new(args.common.width, args.common.height));
    host.reduced_motion = args.reduced_motion;
    let mut player = Player::new(config, host);
    if let Some(password) = &args.password {
        player = player.with_validator(Box::new(FixedPasswordValidator::new(password.clone())));
    }

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    player.subscribe_all(move |e| sink.borrow_mut().push(e.clone()));

    player.select_infographic(presentation)?;
    let limit = Millis(args.until_ms);
    loop {
        match player.pending_gate() {
            Some(GateKind::Password) => {
                let password = args
                    .password
                    .as_deref()
                    .context("presentation is password protected; pass --password")?;
                player.submit_password(password)?;
                if player.pending_gate() == Some(GateKind::Password) {
                    anyhow::bail!("password rejected");
                }
                continue;
            }
            Some(GateKind::UnsafeContent) => {
                let choice = if args.proceed_unsafe {
                    UnsafeChoice::Proceed
                } else {
                    UnsafeChoice::Abort
                };
                player.resolve_unsafe(choice)?;
                continue;
            }
            None => {}
        }
        if matches!(
            player.state(),
            PlaybackState::Finished | PlaybackState::Idle
        ) {
            break;
        }
        match player.next_deadline() {
            Some(at) if at <= limit => player.advance_to(at)?,
            _ => break,
        }
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for event in events.borrow().iter() {
        let line = serde_json::to_string(event).context("serialize event")?;
        writeln!(out, "{line}").context("write event")?;
    }
    eprintln!(
        "stopped at {} in state {:?}",
        player.now(),
        player.state()
    );
    Ok(())
}
