use anyhow::Result;
use std::io::{self, Write};
use std::time::Duration;

use arm_tracker::config::Config;
use arm_tracker::control::{ActuatorCommand, Axis, Speed};
use arm_tracker::sink::{ActuatorSink, MotorMap, OscSink};

const CONFIG_PATH: &str = "config.toml";

fn parse_axis(s: &str) -> Option<Axis> {
    match s {
        "x" => Some(Axis::X),
        "y" => Some(Axis::Y),
        "z" => Some(Axis::Z),
        "g" => Some(Axis::Gripper),
        _ => None,
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let config = Config::load_or_default(CONFIG_PATH)?;
    config.validate()?;
    let map = MotorMap::from_config(&config.motors)?;

    println!("=== Arm Tracker - Motor Test ===");
    println!("接続先: {}", config.sink.addr);
    println!();
    println!("コマンド:");
    println!("  m axis speed  - 軸を速度指定で1ステップ動かす (例: m x 30, axis = x|y|z|g)");
    println!("  s axis        - 軸を停止");
    println!("  t             - ビープ音");
    println!("  w             - 全軸を順番に少しずつ動かす");
    println!("  q             - 終了");
    println!();

    let mut sink = OscSink::from_config(&config.sink, map)?;

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let parts: Vec<&str> = input.split_whitespace().collect();

        if parts.is_empty() {
            continue;
        }

        match parts[0] {
            "m" if parts.len() == 3 => {
                let Some(axis) = parse_axis(parts[1]) else {
                    println!("不明な軸: {}", parts[1]);
                    continue;
                };
                let speed: i32 = parts[2].parse()?;
                let cmd = ActuatorCommand::new(axis, Speed::from_value(speed));
                sink.apply(&[cmd])?;
                println!("送信しました: {}", cmd);
            }
            "s" if parts.len() == 2 => {
                let Some(axis) = parse_axis(parts[1]) else {
                    println!("不明な軸: {}", parts[1]);
                    continue;
                };
                sink.apply(&[ActuatorCommand::stop(axis)])?;
                println!("停止しました: {}", axis);
            }
            "t" => {
                sink.play_tone(100, 600, 500)?;
                println!("送信しました");
            }
            "w" => {
                println!("テスト送信中...");
                for axis in Axis::ALL {
                    let cmd = ActuatorCommand::new(axis, Speed::Run(20)).with_duration(Duration::from_millis(300));
                    sink.apply(&[cmd])?;
                    println!("  {}", cmd);
                    std::thread::sleep(Duration::from_millis(500));
                }
                println!("テスト完了");
            }
            "q" => {
                println!("終了します");
                break;
            }
            _ => {
                println!("不明なコマンド: {}", parts[0]);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_axis() {
        assert_eq!(parse_axis("x"), Some(Axis::X));
        assert_eq!(parse_axis("g"), Some(Axis::Gripper));
        assert_eq!(parse_axis("w"), None);
    }
}
