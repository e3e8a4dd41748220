use anyhow::{Context, Result};
use rosc::{encoder, OscMessage, OscPacket, OscType};
use std::net::UdpSocket;
use std::time::Duration;

use super::motor_map::{Motor, MotorMap};
use super::ActuatorSink;
use crate::config::SinkConfig;
use crate::control::{ActuatorCommand, Speed};

/// ブリッジプロセスの既定アドレス
pub const OSC_DEFAULT_ADDR: &str = "127.0.0.1:9000";

/// 1モーター分のOSCメッセージを構築
///
/// Run:  /ev3/{brick}/motor/step  port, speed, duration_ms, brake
/// Stop: /ev3/{brick}/motor/stop  port, brake
pub fn build_motor_message(motor: Motor, speed: Speed, duration: Duration) -> OscMessage {
    match speed {
        Speed::Run(v) => OscMessage {
            addr: format!("/ev3/{}/motor/step", motor.brick),
            args: vec![
                OscType::String(motor.port.as_str().to_string()),
                OscType::Int(v),
                OscType::Int(duration.as_millis().min(i32::MAX as u128) as i32),
                OscType::Bool(false),
            ],
        },
        Speed::Stop => OscMessage {
            addr: format!("/ev3/{}/motor/stop", motor.brick),
            args: vec![
                OscType::String(motor.port.as_str().to_string()),
                OscType::Bool(false),
            ],
        },
    }
}

/// 指令1つをモーターごとのメッセージへ展開（昇降軸は2台に同じ速度）
pub fn build_command_messages(command: &ActuatorCommand, map: &MotorMap, default_step: Duration) -> Vec<OscMessage> {
    let duration = command.duration.unwrap_or(default_step);
    map.motors(command.axis)
        .iter()
        .map(|m| build_motor_message(*m, command.speed, duration))
        .collect()
}

/// ビープ音: /ev3/{brick}/tone  volume, frequency, duration_ms
pub fn build_tone_message(brick: u8, volume: i32, frequency: i32, duration_ms: i32) -> OscMessage {
    OscMessage {
        addr: format!("/ev3/{}/tone", brick),
        args: vec![
            OscType::Int(volume),
            OscType::Int(frequency),
            OscType::Int(duration_ms),
        ],
    }
}

/// OSCメッセージをバイト列にエンコード
pub fn encode_osc_message(msg: &OscMessage) -> Result<Vec<u8>> {
    let packet = OscPacket::Message(msg.clone());
    let encoded = encoder::encode(&packet)?;
    Ok(encoded)
}

/// UDP/OSC でブリッジへモーター指令を送るシンク
pub struct OscSink {
    socket: UdpSocket,
    target_addr: String,
    map: MotorMap,
    step: Duration,
}

impl OscSink {
    pub fn new(target_addr: &str, map: MotorMap, step: Duration) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0").context("Failed to bind UDP socket")?;
        Ok(Self {
            socket,
            target_addr: target_addr.to_string(),
            map,
            step,
        })
    }

    pub fn from_config(config: &SinkConfig, map: MotorMap) -> Result<Self> {
        Self::new(&config.addr, map, Duration::from_millis(config.step_ms))
    }

    fn send(&self, msg: &OscMessage) -> Result<()> {
        let data = encode_osc_message(msg)?;
        self.socket
            .send_to(&data, &self.target_addr)
            .with_context(|| format!("Failed to send {} to {}", msg.addr, self.target_addr))?;
        Ok(())
    }

    /// 全ブリックでビープを鳴らす（接続確認用）
    pub fn play_tone(&self, volume: i32, frequency: i32, duration_ms: i32) -> Result<()> {
        for brick in self.map.bricks() {
            self.send(&build_tone_message(brick, volume, frequency, duration_ms))?;
        }
        Ok(())
    }
}

impl ActuatorSink for OscSink {
    fn apply(&mut self, commands: &[ActuatorCommand]) -> Result<()> {
        for command in commands {
            for msg in build_command_messages(command, &self.map, self.step) {
                self.send(&msg)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::Axis;
    use crate::sink::MotorPort;
    use rosc::decoder;

    const STEP: Duration = Duration::from_millis(1000);

    #[test]
    fn test_build_run_message() {
        let motor = Motor { brick: 0, port: MotorPort::A };
        let msg = build_motor_message(motor, Speed::Run(50), STEP);
        assert_eq!(msg.addr, "/ev3/0/motor/step");
        assert_eq!(
            msg.args,
            vec![
                OscType::String("A".to_string()),
                OscType::Int(50),
                OscType::Int(1000),
                OscType::Bool(false),
            ]
        );
    }

    #[test]
    fn test_build_stop_message() {
        let motor = Motor { brick: 1, port: MotorPort::D };
        let msg = build_motor_message(motor, Speed::Stop, STEP);
        assert_eq!(msg.addr, "/ev3/1/motor/stop");
        assert_eq!(msg.args, vec![OscType::String("D".to_string()), OscType::Bool(false)]);
    }

    #[test]
    fn test_lift_axis_fans_out() {
        let map = MotorMap::default();
        let cmd = ActuatorCommand::new(Axis::Y, Speed::Run(-30));
        let msgs = build_command_messages(&cmd, &map, STEP);
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].args[0], OscType::String("B".to_string()));
        assert_eq!(msgs[1].args[0], OscType::String("C".to_string()));
        assert!(msgs.iter().all(|m| m.args[1] == OscType::Int(-30)));
    }

    #[test]
    fn test_command_duration_overrides_step() {
        let map = MotorMap::default();
        let cmd = ActuatorCommand::new(Axis::Gripper, Speed::Run(5)).with_duration(Duration::from_millis(300));
        let msgs = build_command_messages(&cmd, &map, STEP);
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].addr, "/ev3/1/motor/step");
        assert_eq!(msgs[0].args[2], OscType::Int(300));
    }

    #[test]
    fn test_tone_message() {
        let msg = build_tone_message(0, 100, 600, 500);
        assert_eq!(msg.addr, "/ev3/0/tone");
        assert_eq!(msg.args, vec![OscType::Int(100), OscType::Int(600), OscType::Int(500)]);
    }

    #[test]
    fn test_encode_osc_message() {
        let motor = Motor { brick: 0, port: MotorPort::B };
        let msg = build_motor_message(motor, Speed::Run(12), STEP);
        let encoded = encode_osc_message(&msg).unwrap();
        assert!(!encoded.is_empty());
    }

    #[test]
    fn test_sink_sends_udp() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let addr = receiver.local_addr().unwrap().to_string();

        let mut sink = OscSink::new(&addr, MotorMap::default(), STEP).unwrap();
        sink.apply(&[ActuatorCommand::new(Axis::X, Speed::Run(40))]).unwrap();

        let mut buf = [0u8; 1024];
        let (len, _) = receiver.recv_from(&mut buf).unwrap();
        let (_, packet) = decoder::decode_udp(&buf[..len]).unwrap();
        match packet {
            OscPacket::Message(msg) => {
                assert_eq!(msg.addr, "/ev3/0/motor/step");
                assert_eq!(msg.args[1], OscType::Int(40));
            }
            other => panic!("unexpected packet: {:?}", other),
        }
    }
}
