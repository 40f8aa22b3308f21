use prize_dash_core::catalog::CharacterId;
use prize_dash_core::game_mode::GameMode;
use prize_dash_core::input::{MenuAction, STANDARD_BUTTONS};
use prize_dash_core::player::{SLOT_COUNT, SlotId};

use crate::error::HostError;

/// Commands sent to the session loop.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    Select { slot: SlotId, character: CharacterId },
    Deselect { slot: SlotId },
    Mode(GameMode),
    Start,
    Exit,
    RequestExit,
    CancelExit,
    ConfirmExit,
    KeyDown(String),
    KeyUp(String),
    Action { slot: SlotId, action: MenuAction },
    PadConnected { index: usize },
    PadDisconnected { index: usize },
    PadButton { index: usize, button: usize, pressed: bool },
    PadAxes { index: usize, x: f32, y: f32 },
    Resize { width: f32, height: f32 },
    Stop,
}

fn arg<'a>(parts: &mut impl Iterator<Item = &'a str>, what: &str) -> Result<&'a str, HostError> {
    parts
        .next()
        .ok_or_else(|| HostError::Command(format!("missing {what}")))
}

fn number<'a, T: std::str::FromStr>(
    parts: &mut impl Iterator<Item = &'a str>,
    what: &str,
) -> Result<T, HostError> {
    let raw = arg(parts, what)?;
    raw.parse()
        .map_err(|_| HostError::Command(format!("{what} must be a number, got {raw:?}")))
}

fn slot<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Result<SlotId, HostError> {
    let slot: SlotId = number(parts, "slot")?;
    if slot >= SLOT_COUNT {
        return Err(HostError::Command(format!("slot must be 0 or 1, got {slot}")));
    }
    Ok(slot)
}

fn parse_mode(raw: &str) -> Result<GameMode, HostError> {
    match raw.to_ascii_lowercase().as_str() {
        "free" | "freeplay" | "free-play" => Ok(GameMode::FreePlay),
        "race" => Ok(GameMode::Race),
        "countdown" | "timed" => Ok(GameMode::Countdown),
        other => Err(HostError::Command(format!("unknown mode {other:?}"))),
    }
}

fn parse_action(raw: &str) -> Result<MenuAction, HostError> {
    match raw.to_ascii_lowercase().as_str() {
        "left" => Ok(MenuAction::Left),
        "right" => Ok(MenuAction::Right),
        "up" => Ok(MenuAction::Up),
        "down" => Ok(MenuAction::Down),
        "confirm" => Ok(MenuAction::Confirm),
        "back" => Ok(MenuAction::Back),
        "start" => Ok(MenuAction::Start),
        "exit" => Ok(MenuAction::Exit),
        other => Err(HostError::Command(format!("unknown action {other:?}"))),
    }
}

/// Parse one line of the text driver, e.g. `select 0 aria` or `pad 0 button 12 on`.
pub fn parse_command(line: &str) -> Result<HostCommand, HostError> {
    let mut parts = line.split_whitespace();
    let verb = arg(&mut parts, "command")?;
    let command = match verb {
        "select" => HostCommand::Select {
            slot: slot(&mut parts)?,
            character: CharacterId::new(arg(&mut parts, "character")?),
        },
        "deselect" => HostCommand::Deselect {
            slot: slot(&mut parts)?,
        },
        "mode" => HostCommand::Mode(parse_mode(arg(&mut parts, "mode")?)?),
        "start" => HostCommand::Start,
        "exit" => HostCommand::Exit,
        "leave" => HostCommand::RequestExit,
        "stay" => HostCommand::CancelExit,
        "confirm-exit" => HostCommand::ConfirmExit,
        "keydown" => HostCommand::KeyDown(arg(&mut parts, "key code")?.to_string()),
        "keyup" => HostCommand::KeyUp(arg(&mut parts, "key code")?.to_string()),
        "action" => HostCommand::Action {
            slot: slot(&mut parts)?,
            action: parse_action(arg(&mut parts, "action")?)?,
        },
        "pad" => {
            let index: usize = number(&mut parts, "gamepad index")?;
            match arg(&mut parts, "pad command")? {
                "connect" => HostCommand::PadConnected { index },
                "disconnect" => HostCommand::PadDisconnected { index },
                "button" => {
                    let button: usize = number(&mut parts, "button")?;
                    if button >= STANDARD_BUTTONS {
                        return Err(HostError::Command(format!(
                            "button must be below {STANDARD_BUTTONS}, got {button}"
                        )));
                    }
                    let pressed = match arg(&mut parts, "on|off")? {
                        "on" => true,
                        "off" => false,
                        other => {
                            return Err(HostError::Command(format!(
                                "button state must be on or off, got {other:?}"
                            )));
                        },
                    };
                    HostCommand::PadButton {
                        index,
                        button,
                        pressed,
                    }
                },
                "axes" => HostCommand::PadAxes {
                    index,
                    x: number(&mut parts, "x axis")?,
                    y: number(&mut parts, "y axis")?,
                },
                other => return Err(HostError::Command(format!("unknown pad command {other:?}"))),
            }
        },
        "resize" => HostCommand::Resize {
            width: number(&mut parts, "width")?,
            height: number(&mut parts, "height")?,
        },
        "quit" | "stop" => HostCommand::Stop,
        other => return Err(HostError::Command(format!("unknown command {other:?}"))),
    };
    if let Some(extra) = parts.next() {
        return Err(HostError::Command(format!("unexpected argument {extra:?}")));
    }
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_menu_commands() {
        assert_eq!(
            parse_command("select 1 aria").unwrap(),
            HostCommand::Select {
                slot: 1,
                character: CharacterId::new("aria"),
            }
        );
        assert_eq!(
            parse_command("mode Race").unwrap(),
            HostCommand::Mode(GameMode::Race)
        );
        assert_eq!(parse_command("  start ").unwrap(), HostCommand::Start);
        assert_eq!(
            parse_command("action 0 confirm").unwrap(),
            HostCommand::Action {
                slot: 0,
                action: MenuAction::Confirm,
            }
        );
    }

    #[test]
    fn parses_pad_commands() {
        assert_eq!(
            parse_command("pad 2 button 12 on").unwrap(),
            HostCommand::PadButton {
                index: 2,
                button: 12,
                pressed: true,
            }
        );
        assert_eq!(
            parse_command("pad 0 button 16 off").unwrap(),
            HostCommand::PadButton {
                index: 0,
                button: 16,
                pressed: false,
            }
        );
        assert_eq!(
            parse_command("pad 0 axes 0.5 -1").unwrap(),
            HostCommand::PadAxes {
                index: 0,
                x: 0.5,
                y: -1.0,
            }
        );
        assert_eq!(
            parse_command("pad 3 disconnect").unwrap(),
            HostCommand::PadDisconnected { index: 3 }
        );
    }

    #[test]
    fn rejects_malformed_lines() {
        for line in [
            "",
            "select 2 aria",
            "select 0",
            "mode sprint",
            "resize wide 600",
            "pad 0 button 1 maybe",
            "pad 0 button 17 on",
            "pad 0 button 18446744073709551615 on",
            "start now",
            "dance",
        ] {
            assert!(
                matches!(parse_command(line), Err(HostError::Command(_))),
                "{line:?} should be rejected"
            );
        }
    }
}
