//! Text trace of arcade-side events to replay through the shim

use shim_common::frontend::HostInputState;
use thiserror::Error;

const OBJECT_SLOTS: i64 = 64;
const ANALOG_CHANNELS: i64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceCommand {
    Palette { index: u8, value: u16 },
    Object { slot: usize, value: u32 },
    Playfield { address: u16, value: u16 },
    Input(HostInputState),
    Select { channel: usize },
    VBlank { count: u32 },
}

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },
    #[error("line {line}: '{command}' takes {expected} arguments, got {actual}")]
    ArgumentCount { line: usize, command: &'static str, expected: &'static str, actual: usize },
    #[error("line {line}: invalid number '{token}'")]
    InvalidNumber { line: usize, token: String },
    #[error("line {line}: {what} out of range: {value}")]
    OutOfRange { line: usize, what: &'static str, value: i64 },
}

fn parse_number(line: usize, token: &str) -> Result<i64, TraceError> {
    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };

    let invalid = || TraceError::InvalidNumber { line, token: token.into() };

    let (radix, digits) = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => (16, hex),
        None => (10, digits),
    };

    // Only one leading '-', before any radix prefix
    if digits.starts_with(['+', '-']) {
        return Err(invalid());
    }

    let n = i64::from_str_radix(digits, radix).map_err(|_| invalid())?;
    Ok(if negative { -n } else { n })
}

fn parse_in_range<T: TryFrom<i64>>(
    line: usize,
    what: &'static str,
    token: &str,
) -> Result<T, TraceError> {
    let value = parse_number(line, token)?;
    T::try_from(value).map_err(|_| TraceError::OutOfRange { line, what, value })
}

fn parse_below(line: usize, what: &'static str, token: &str, limit: i64) -> Result<usize, TraceError> {
    let value = parse_number(line, token)?;
    if !(0..limit).contains(&value) {
        return Err(TraceError::OutOfRange { line, what, value });
    }
    Ok(value as usize)
}

fn expect_args(
    line: usize,
    command: &'static str,
    args: &[&str],
    counts: &[usize],
    expected: &'static str,
) -> Result<(), TraceError> {
    if counts.contains(&args.len()) {
        Ok(())
    } else {
        Err(TraceError::ArgumentCount { line, command, expected, actual: args.len() })
    }
}

fn parse_line(line: usize, command: &str, args: &[&str]) -> Result<TraceCommand, TraceError> {
    let command = match command {
        "pal" => {
            expect_args(line, "pal", args, &[2], "2")?;
            TraceCommand::Palette {
                index: parse_in_range(line, "palette index", args[0])?,
                value: parse_in_range(line, "palette value", args[1])?,
            }
        }
        "obj" => {
            expect_args(line, "obj", args, &[2], "2")?;
            TraceCommand::Object {
                slot: parse_below(line, "object slot", args[0], OBJECT_SLOTS)?,
                value: parse_in_range(line, "object word", args[1])?,
            }
        }
        "pf" => {
            expect_args(line, "pf", args, &[2], "2")?;
            TraceCommand::Playfield {
                address: parse_in_range(line, "playfield address", args[0])?,
                value: parse_in_range(line, "playfield value", args[1])?,
            }
        }
        "input" => {
            expect_args(line, "input", args, &[3], "3")?;
            TraceCommand::Input(HostInputState {
                buttons: parse_in_range(line, "button mask", args[0])?,
                axis_h: parse_in_range(line, "horizontal axis", args[1])?,
                axis_v: parse_in_range(line, "vertical axis", args[2])?,
            })
        }
        "select" => {
            expect_args(line, "select", args, &[1], "1")?;
            TraceCommand::Select { channel: parse_below(line, "analog channel", args[0], ANALOG_CHANNELS)? }
        }
        "vblank" => {
            expect_args(line, "vblank", args, &[0, 1], "0 or 1")?;
            let count = match args.first() {
                Some(token) => parse_in_range(line, "vblank count", token)?,
                None => 1,
            };
            TraceCommand::VBlank { count }
        }
        _ => return Err(TraceError::UnknownCommand { line, command: command.into() }),
    };

    Ok(command)
}

/// Parse a trace, one command per line. `#` starts a comment; blank lines are ignored.
///
/// # Errors
///
/// Returns an error naming the 1-based line number of the first line that fails to parse.
pub fn parse(text: &str) -> Result<Vec<TraceCommand>, TraceError> {
    let mut commands = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line_number = i + 1;
        let content = line.split('#').next().unwrap_or("");

        let mut tokens = content.split_whitespace();
        let Some(command) = tokens.next() else { continue };
        let args: Vec<_> = tokens.collect();

        commands.push(parse_line(line_number, command, &args)?);
    }

    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn parses_every_command() {
        let text = "\
# attract mode
pal 0x10 0xFFC3
obj 16 0x05020060   # first live slot
pf 0x7FE 0x8130

input 0x411 -128 127
select 3
vblank
vblank 0x3C
";
        let commands = parse(text).unwrap();
        assert_eq!(
            commands,
            vec![
                TraceCommand::Palette { index: 0x10, value: 0xFFC3 },
                TraceCommand::Object { slot: 16, value: 0x0502_0060 },
                TraceCommand::Playfield { address: 0x7FE, value: 0x8130 },
                TraceCommand::Input(HostInputState { buttons: 0x411, axis_h: -128, axis_v: 127 }),
                TraceCommand::Select { channel: 3 },
                TraceCommand::VBlank { count: 1 },
                TraceCommand::VBlank { count: 60 },
            ]
        );
    }

    #[test]
    fn errors_carry_line_numbers() {
        let err = parse("vblank\nwait 5\n").unwrap_err();
        assert!(matches!(err, TraceError::UnknownCommand { line: 2, ref command } if command == "wait"));

        let err = parse("pal 1\n").unwrap_err();
        assert!(matches!(err, TraceError::ArgumentCount { line: 1, command: "pal", actual: 1, .. }));

        let err = parse("\n\npf 0xZZ 1\n").unwrap_err();
        assert!(matches!(err, TraceError::InvalidNumber { line: 3, .. }));
    }

    #[test]
    fn only_one_leading_minus_is_a_sign() {
        for token in ["0x-5", "0x+5", "--5", "+5", "-+5", "-"] {
            let err = parse(&format!("vblank {token}")).unwrap_err();
            assert!(
                matches!(err, TraceError::InvalidNumber { line: 1, token: ref bad } if bad == token),
                "{token}: {err}"
            );
        }

        assert_eq!(parse("input 0 -0x10 0").unwrap(), vec![TraceCommand::Input(HostInputState {
            buttons: 0,
            axis_h: -16,
            axis_v: 0,
        })]);
    }

    #[test]
    fn range_checks() {
        assert!(matches!(
            parse("pal 256 0").unwrap_err(),
            TraceError::OutOfRange { what: "palette index", value: 256, .. }
        ));
        assert!(matches!(
            parse("obj 64 0").unwrap_err(),
            TraceError::OutOfRange { what: "object slot", value: 64, .. }
        ));
        assert!(matches!(
            parse("input 0 -129 0").unwrap_err(),
            TraceError::OutOfRange { what: "horizontal axis", value: -129, .. }
        ));
        assert!(matches!(
            parse("select 4").unwrap_err(),
            TraceError::OutOfRange { what: "analog channel", value: 4, .. }
        ));
        assert!(matches!(
            parse("vblank -1").unwrap_err(),
            TraceError::OutOfRange { what: "vblank count", value: -1, .. }
        ));
    }
}
