//! Remote show control over MQTT
//!
//! Connects to an MQTT broker and subscribes to a topic. Incoming payloads
//! are parsed into show commands and forwarded to the main loop, so the
//! fireworks can be driven from home-automation gear as well as the keyboard.

use rumqttc::{Client, Event, MqttOptions, Packet, QoS};
use serde::Deserialize;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 1883;
const DEFAULT_TOPIC: &str = "skyburst";

/// Commands accepted over the control topic
#[derive(Debug, Clone)]
pub enum ShowCommand {
    Start { celebrate: bool },
    Stop,
    Pause,
    Resume,
    /// Manual burst; missing coordinates fall back to the default launch zone
    Burst { x: Option<f32>, y: Option<f32> },
    Mute(bool),
    Quit,
}

/// JSON payload format (optional; plain text also works)
#[derive(Deserialize)]
struct JsonCommand {
    action: String,
    #[serde(default)]
    celebrate: Option<bool>,
    #[serde(default)]
    x: Option<f32>,
    #[serde(default)]
    y: Option<f32>,
}

/// MQTT controller receiving commands in a background thread
pub struct MqttControl {
    receiver: Receiver<ShowCommand>,
    _thread: thread::JoinHandle<()>,
}

impl MqttControl {
    /// Connect to the broker and subscribe.
    /// Fails immediately if the connection cannot be established.
    pub fn new(host: &str, topic: &str) -> Result<Self, String> {
        let host = if host.is_empty() { DEFAULT_HOST } else { host };
        let topic = if topic.is_empty() { DEFAULT_TOPIC } else { topic };

        let mut options = MqttOptions::new("skyburst", host, DEFAULT_PORT);
        options.set_keep_alive(Duration::from_secs(30));

        let (client, mut connection) = Client::new(options, 10);

        client
            .subscribe(topic, QoS::AtMostOnce)
            .map_err(|e| format!("Failed to subscribe to topic '{}': {}", topic, e))?;

        // Test connection by polling once - fail fast if broker unreachable
        match connection.iter().next() {
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                return Err(format!(
                    "Failed to connect to MQTT broker at {}:{} - {}",
                    host, DEFAULT_PORT, e
                ));
            }
            None => {
                return Err(format!(
                    "Failed to connect to MQTT broker at {}:{} - connection closed",
                    host, DEFAULT_PORT
                ));
            }
        }

        let (sender, receiver) = mpsc::channel();
        let topic_owned = topic.to_string();

        let handle = thread::spawn(move || {
            Self::message_loop(connection, sender, &topic_owned);
        });

        eprintln!(
            "MQTT: Connected to {}:{}, subscribed to '{}'",
            host, DEFAULT_PORT, topic
        );

        Ok(Self {
            receiver,
            _thread: handle,
        })
    }

    fn message_loop(
        mut connection: rumqttc::Connection,
        sender: Sender<ShowCommand>,
        topic: &str,
    ) {
        for event in connection.iter() {
            match event {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    if publish.topic != topic {
                        continue;
                    }
                    if let Ok(text) = String::from_utf8(publish.payload.to_vec()) {
                        if let Some(cmd) = Self::parse_command(text.trim()) {
                            if sender.send(cmd).is_err() {
                                // Main thread gone, exit
                                break;
                            }
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("MQTT error: {}", e);
                    // Continue trying - connection may recover
                }
            }
        }
    }

    /// Parse a payload: JSON first, plain text as fallback
    fn parse_command(text: &str) -> Option<ShowCommand> {
        if text.is_empty() {
            return None;
        }
        if let Ok(json) = serde_json::from_str::<JsonCommand>(text) {
            return Self::from_json(json);
        }
        Self::parse_plain(text)
    }

    fn from_json(json: JsonCommand) -> Option<ShowCommand> {
        match json.action.to_lowercase().as_str() {
            "start" => Some(ShowCommand::Start {
                celebrate: json.celebrate.unwrap_or(true),
            }),
            "stop" => Some(ShowCommand::Stop),
            "pause" => Some(ShowCommand::Pause),
            "resume" => Some(ShowCommand::Resume),
            "burst" => Some(ShowCommand::Burst {
                x: json.x,
                y: json.y,
            }),
            "mute" => Some(ShowCommand::Mute(true)),
            "unmute" => Some(ShowCommand::Mute(false)),
            "quit" => Some(ShowCommand::Quit),
            _ => None,
        }
    }

    fn parse_plain(line: &str) -> Option<ShowCommand> {
        let line = line.trim().to_lowercase();
        match line.as_str() {
            "start" | "go" | "celebrate" => Some(ShowCommand::Start { celebrate: true }),
            "start quiet" => Some(ShowCommand::Start { celebrate: false }),
            "stop" => Some(ShowCommand::Stop),
            "pause" => Some(ShowCommand::Pause),
            "resume" => Some(ShowCommand::Resume),
            "burst" | "fire" => Some(ShowCommand::Burst { x: None, y: None }),
            "mute" => Some(ShowCommand::Mute(true)),
            "unmute" => Some(ShowCommand::Mute(false)),
            "q" | "quit" | "exit" => Some(ShowCommand::Quit),
            _ => {
                // "burst X Y" with explicit coordinates
                let rest = line.strip_prefix("burst ").or_else(|| line.strip_prefix("fire "))?;
                let mut parts = rest.split_whitespace();
                let x = parts.next()?.parse().ok()?;
                let y = parts.next()?.parse().ok()?;
                Some(ShowCommand::Burst {
                    x: Some(x),
                    y: Some(y),
                })
            }
        }
    }

    /// Get any pending commands (non-blocking)
    pub fn poll(&self) -> Vec<ShowCommand> {
        let mut commands = Vec::new();
        while let Ok(cmd) = self.receiver.try_recv() {
            commands.push(cmd);
        }
        commands
    }

    /// Default MQTT host
    pub fn default_host() -> &'static str {
        DEFAULT_HOST
    }

    /// Default MQTT topic
    pub fn default_topic() -> &'static str {
        DEFAULT_TOPIC
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_commands() {
        assert!(matches!(
            MqttControl::parse_command("start"),
            Some(ShowCommand::Start { celebrate: true })
        ));
        assert!(matches!(
            MqttControl::parse_command("start quiet"),
            Some(ShowCommand::Start { celebrate: false })
        ));
        assert!(matches!(
            MqttControl::parse_command("PAUSE"),
            Some(ShowCommand::Pause)
        ));
        assert!(matches!(
            MqttControl::parse_command("quit"),
            Some(ShowCommand::Quit)
        ));
        assert!(MqttControl::parse_command("bogus").is_none());
        assert!(MqttControl::parse_command("").is_none());
    }

    #[test]
    fn test_parse_burst_with_coordinates() {
        match MqttControl::parse_command("burst 120 80") {
            Some(ShowCommand::Burst { x: Some(x), y: Some(y) }) => {
                assert_eq!(x, 120.0);
                assert_eq!(y, 80.0);
            }
            other => panic!("unexpected parse: {:?}", other),
        }
        assert!(matches!(
            MqttControl::parse_command("fire"),
            Some(ShowCommand::Burst { x: None, y: None })
        ));
        assert!(MqttControl::parse_command("burst 120").is_none());
    }

    #[test]
    fn test_parse_json_commands() {
        assert!(matches!(
            MqttControl::parse_command(r#"{"action": "start", "celebrate": false}"#),
            Some(ShowCommand::Start { celebrate: false })
        ));
        match MqttControl::parse_command(r#"{"action": "burst", "x": 300, "y": 150}"#) {
            Some(ShowCommand::Burst { x: Some(x), y: Some(y) }) => {
                assert_eq!(x, 300.0);
                assert_eq!(y, 150.0);
            }
            other => panic!("unexpected parse: {:?}", other),
        }
        assert!(matches!(
            MqttControl::parse_command(r#"{"action": "mute"}"#),
            Some(ShowCommand::Mute(true))
        ));
        assert!(MqttControl::parse_command(r#"{"action": "warp"}"#).is_none());
    }
}
