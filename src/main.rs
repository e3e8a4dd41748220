use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use arm_tracker::config::Config;
use arm_tracker::control::{ActuatorCommand, Axis, ControlInput, PoseController, SharedController};
use arm_tracker::error::ControlError;
use arm_tracker::feed::{FeedError, FeedRecord, FrameReader};
use arm_tracker::sink::{ActuatorSink, LogSink, MotorMap, OscSink};

const CONFIG_PATH: &str = "config.toml";

#[derive(Parser, Debug)]
#[command(name = "arm_tracker")]
#[command(version, about = "Drive a robot arm from skeleton frames")]
struct Args {
    /// Config file (defaults are used when missing)
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,

    /// JSON Lines frame file, or "-" for stdin
    #[arg(long, default_value = "-")]
    frames: String,

    /// Log commands instead of sending them over OSC
    #[arg(long)]
    dry_run: bool,

    /// Replay rate for frame files (0 = as fast as possible)
    #[arg(long, default_value_t = 30.0)]
    fps: f64,
}

enum Event {
    Command(ActuatorCommand),
    Quit,
}

/// stdin から操作を読むスレッド。グリッパー指令と終了はメインループへ送る
fn spawn_control_surface(controller: SharedController, tx: mpsc::Sender<Event>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let event = match ControlInput::parse(&line) {
                Some(ControlInput::Quit) => Some(Event::Quit),
                Some(input) => controller.control(input).map(Event::Command),
                None => {
                    println!("不明なコマンド: {}", line.trim());
                    None
                }
            };
            if let Some(event) = event {
                let quit = matches!(event, Event::Quit);
                if tx.send(event).is_err() || quit {
                    break;
                }
            }
        }
    })
}

fn build_sink(config: &Config, map: MotorMap, dry_run: bool) -> Result<Box<dyn ActuatorSink>> {
    if dry_run {
        println!("Sink: dry-run (log only)");
        return Ok(Box::new(LogSink::new(map)));
    }
    let sink = OscSink::from_config(&config.sink, map)?;
    println!("Sink: OSC -> {}", config.sink.addr);
    if config.sink.startup_tone {
        sink.play_tone(100, 600, 500)?;
    }
    Ok(Box::new(sink))
}

fn stop_all(sink: &mut dyn ActuatorSink) -> Result<()> {
    let stops: Vec<ActuatorCommand> = Axis::ALL.iter().map(|a| ActuatorCommand::stop(*a)).collect();
    sink.apply(&stops)
}

/// 操作スレッドから届いた指令をすべて流す。終了要求があれば true
fn drain_events(rx: &mpsc::Receiver<Event>, sink: &mut dyn ActuatorSink) -> Result<bool> {
    let mut quit = false;
    while let Ok(event) = rx.try_recv() {
        match event {
            Event::Command(cmd) => sink.apply(&[cmd])?,
            Event::Quit => quit = true,
        }
    }
    Ok(quit)
}

#[derive(Debug, Default, PartialEq)]
struct Stats {
    frames: u64,
    /// 必須ジョイントが欠けていたフレーム
    skipped: u64,
    /// 読めなかった行
    invalid: u64,
}

fn frame_loop<I>(
    records: I,
    controller: &SharedController,
    sink: &mut dyn ActuatorSink,
    rx: &mpsc::Receiver<Event>,
    frame_duration: Option<Duration>,
    stats: &mut Stats,
) -> Result<()>
where
    I: Iterator<Item = Result<FeedRecord, FeedError>>,
{
    let mut was_calibrated = controller.is_calibrated();

    for record in records {
        let loop_start = Instant::now();

        if drain_events(rx, sink)? {
            break;
        }

        let frame = match record {
            Ok(FeedRecord::Frame(frame)) => Some(frame),
            Ok(FeedRecord::Control(ControlInput::Quit)) => break,
            Ok(FeedRecord::Control(input)) => {
                if let Some(cmd) = controller.control(input) {
                    sink.apply(&[cmd])?;
                }
                None
            }
            Err(err) if err.is_fatal() => return Err(err.into()),
            Err(err) => {
                stats.invalid += 1;
                tracing::warn!("Skipping input: {}", err);
                None
            }
        };

        if let Some(frame) = &frame {
            stats.frames += 1;
            match controller.process(frame) {
                Ok(commands) => {
                    if !commands.is_empty() {
                        sink.apply(&commands).context("Failed to apply actuator commands")?;
                    }
                }
                Err(err @ ControlError::MissingJoint { .. }) => {
                    stats.skipped += 1;
                    tracing::debug!("Frame {} skipped: {}", stats.frames, err);
                }
                Err(err) => return Err(err.into()),
            }
        }

        let calibrated = controller.is_calibrated();
        if calibrated != was_calibrated {
            if calibrated {
                println!("Calibrated! ({} arm)", controller.active_side());
            } else {
                println!("Calibration lost, Tポーズで再キャリブレーション");
                stop_all(sink)?;
            }
            was_calibrated = calibrated;
        }

        if let (Some(d), Some(_)) = (frame_duration, frame) {
            let elapsed = loop_start.elapsed();
            if elapsed < d {
                thread::sleep(d - elapsed);
            }
        }
    }
    Ok(())
}

/// フレームを最後まで流す。どの経路で抜けても最後に全モーターを止める
fn run<I>(
    records: I,
    controller: &SharedController,
    sink: &mut dyn ActuatorSink,
    rx: &mpsc::Receiver<Event>,
    frame_duration: Option<Duration>,
) -> Result<Stats>
where
    I: Iterator<Item = Result<FeedRecord, FeedError>>,
{
    let mut stats = Stats::default();
    let result = frame_loop(records, controller, sink, rx, frame_duration, &mut stats)
        .and_then(|()| drain_events(rx, sink).map(drop));
    let stopped = stop_all(sink).context("Failed to stop motors");
    if let (Err(_), Err(err)) = (&result, &stopped) {
        tracing::error!("{:#}", err);
    }
    result.and(stopped).map(|()| stats)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("arm_tracker=info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::load_or_default(&args.config)?;
    config.validate()?;
    let map = MotorMap::from_config(&config.motors)?;

    println!("=== Arm Tracker ===");
    println!("Precision: {}", config.controller.precision);
    println!("Active arm: {}", config.controller.initial_side);
    println!("Gripper reference: {:?}", config.controller.gripper_reference);
    match config.controller.pose_loss_timeout_ms {
        Some(ms) => println!("Pose-loss timeout: {}ms", ms),
        None => println!("Pose-loss timeout: off"),
    }

    let controller = SharedController::new(PoseController::from_config(&config)?);
    let mut sink = build_sink(&config, map, args.dry_run)?;

    let (tx, rx) = mpsc::channel::<Event>();
    let records: Box<dyn Iterator<Item = Result<FeedRecord, FeedError>>> = if args.frames == "-" {
        // stdin はフレーム入力に使うので、操作は同じ流れの {"control": "l"} 行で受け取る
        println!("Frames: stdin (操作は {{\"control\": \"l\"}} 形式の行)");
        Box::new(FrameReader::stdin())
    } else {
        println!("Frames: {}", args.frames);
        println!();
        println!("操作:");
        println!("  l / r  - 左腕 / 右腕に切り替え（再キャリブレーション）");
        println!("  c / o  - グリッパーを閉じる / 開く");
        println!("  x      - キャリブレーション解除");
        println!("  q      - 終了");
        let records = FrameReader::open(&args.frames)?;
        spawn_control_surface(controller.clone(), tx);
        Box::new(records)
    };
    println!();
    println!("Tポーズ（腕を横に水平に伸ばす）でキャリブレーション");

    let frame_duration = (args.fps > 0.0).then(|| Duration::from_secs_f64(1.0 / args.fps));
    let stats = run(records, &controller, sink.as_mut(), &rx, frame_duration)?;

    println!(
        "Frames: {} processed, {} skipped, {} invalid lines",
        stats.frames, stats.skipped, stats.invalid
    );
    println!("Shutting down...");
    Ok(())
}
