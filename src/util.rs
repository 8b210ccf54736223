use crate::keyboard::key_center;
use crate::player::ControlMsg;
use log::info;

/// Turns one line typed on stdin into a control message.
///
/// Accepts `q`/`quit`/`stop`, `n`/`names`, a pitch number (clicks that key),
/// or a raw `x y` coordinate pair.
pub fn parse_command(input: &str) -> Option<ControlMsg> {
    let input = input.trim();
    match input.to_lowercase().as_str() {
        "" => None,
        "q" | "quit" | "stop" => Some(ControlMsg::Stop),
        "n" | "names" => Some(ControlMsg::ShowNoteNames),
        other => {
            let parts: Vec<&str> = other.split_whitespace().collect();
            match parts.as_slice() {
                [pitch] => match pitch.parse::<u8>().ok().and_then(key_center) {
                    Some((x, y)) => Some(ControlMsg::Click { x, y }),
                    None => {
                        info!("'{}' is not a key on the keyboard..!", pitch);
                        None
                    }
                },
                [x, y] => match (x.parse::<f64>(), y.parse::<f64>()) {
                    (Ok(x), Ok(y)) => Some(ControlMsg::Click { x, y }),
                    _ => {
                        info!("Couldn't read '{}' as a click..!", other);
                        None
                    }
                },
                _ => {
                    info!("Unknown command '{}'..!\nTry `names`, `stop`, a pitch like `60`, or `x y`..!", other);
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn commands() {
        env_logger::try_init().unwrap_or(());

        assert_eq!(parse_command("q\n"), Some(ControlMsg::Stop));
        assert_eq!(parse_command(" STOP "), Some(ControlMsg::Stop));
        assert_eq!(parse_command("names"), Some(ControlMsg::ShowNoteNames));
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("play something"), None);
    }

    #[test]
    fn clicks() {
        env_logger::try_init().unwrap_or(());

        assert_eq!(
            parse_command("11.5 -230"),
            Some(ControlMsg::Click { x: 11.5, y: -230.0 })
        );
        assert_eq!(parse_command("11.5 low"), None);

        let Some(ControlMsg::Click { x, y }) = parse_command("60") else {
            panic!("pitch should become a click");
        };
        assert_eq!(crate::keyboard::locate_pitch(x, y), Some(60));

        assert_eq!(parse_command("300"), None);
    }
}
