//! Command grammar.
//!
//! A finished line is classified in two steps: first its family (local
//! `AT`, remote `RT`, or neither), then the single-character selectors
//! that pick one command. The result is a plain value; nothing here
//! touches a collaborator, so every branch can be checked in isolation.
//!
//! | Line                | Command                                  |
//! |---------------------|------------------------------------------|
//! | `AT`                | [`AtCommand::Attention`]                 |
//! | `AT&F` / `AT&W`     | factory defaults / save parameters       |
//! | `AT&UPDATE`         | force the firmware-update fault          |
//! | `AT&T[=RSSI\|=TDM]` | clear / toggle test modes                |
//! | `AT+P=n`            | power level                              |
//! | `AT+Cn?` / `AT+Cn=v`| read / write calibration channel         |
//! | `AT+L`              | lock calibration                         |
//! | `ATI[n]`            | information query                        |
//! | `ATPP`              | list pins                                |
//! | `ATPx=d[,v]`        | pin output / input / read / write        |
//! | `ATSn?` / `ATSn=v`  | read / write parameter register          |
//! | `ATO`               | leave command mode                       |
//! | `ATZ`               | reset                                    |
//! | `RT<cmd>[,dest]`    | relay `<cmd>` to `dest` or everyone      |

use crate::board::Destination;
use crate::error::{AtError, AtResult};
use crate::testmode::TestMode;

/// A classified command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    /// A local command, or the reason it could not be parsed.
    At(AtResult<AtCommand>),
    /// A command to relay to another node.
    Remote {
        /// Where to send it; `Err` if the address is unusable.
        destination: AtResult<Destination>,
        /// The command text, without the `RT` prefix or address suffix.
        command: &'a str,
    },
    /// Neither `AT` nor `RT`; consumed without a reply.
    Ignored,
}

/// A parsed local command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtCommand {
    /// Bare `AT`.
    Attention,
    /// `AT&F`: restore default parameters.
    FactoryReset,
    /// `AT&W`: persist parameters.
    Save,
    /// `AT&UPDATE`: fault into the bootloader's update mode.
    ForceUpdate,
    /// `AT&T`: clear or toggle test modes.
    TestMode(TestModeChange),
    /// `AT+P=n`: set the power-level PWM.
    PowerLevel(u32),
    /// `AT+Cn?`: read calibration channel `n`.
    CalibrationRead(u32),
    /// `AT+Cn=v`: write calibration channel `n`.
    CalibrationWrite {
        /// Channel index.
        channel: u32,
        /// Raw value; stored modulo 256.
        value: u32,
    },
    /// `AT+L`: lock the calibration area.
    CalibrationLock,
    /// `ATIn`: information query.
    Info(InfoQuery),
    /// `ATPP`: list every pin.
    PinList,
    /// `ATPx=d`: operate on one pin.
    Pin {
        /// Pin index (single digit).
        pin: u8,
        /// Operation.
        op: PinOp,
    },
    /// `ATSn?`: read register `n`.
    ParamRead(u32),
    /// `ATSn=v`: write register `n`.
    ParamWrite {
        /// Register index.
        index: u32,
        /// New value.
        value: u32,
    },
    /// `ATO`: return to data mode.
    Online,
    /// `ATZ`: reset the board.
    Reset,
}

impl AtCommand {
    /// Command family, used as a metric label.
    pub fn family(&self) -> &'static str {
        match self {
            AtCommand::Attention => "attention",
            AtCommand::FactoryReset
            | AtCommand::Save
            | AtCommand::ForceUpdate
            | AtCommand::TestMode(_) => "ampersand",
            AtCommand::PowerLevel(_)
            | AtCommand::CalibrationRead(_)
            | AtCommand::CalibrationWrite { .. }
            | AtCommand::CalibrationLock => "plus",
            AtCommand::Info(_) => "info",
            AtCommand::PinList | AtCommand::Pin { .. } => "pin",
            AtCommand::ParamRead(_) | AtCommand::ParamWrite { .. } => "register",
            AtCommand::Online => "online",
            AtCommand::Reset => "reset",
        }
    }
}

/// `AT&T` variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestModeChange {
    /// Bare `AT&T`.
    ClearAll,
    /// `AT&T=RSSI` or `AT&T=TDM`.
    Toggle(TestMode),
}

/// `ATI` sub-selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoQuery {
    /// `ATI`, `ATI0`
    Banner,
    /// `ATI1`
    Version,
    /// `ATI2`
    BoardId,
    /// `ATI3`
    Frequency,
    /// `ATI4`
    Bootloader,
    /// `ATI5`
    Parameters,
    /// `ATI6`
    Timing,
    /// `ATI7`
    Signal,
    /// `ATI8`
    Sync,
}

/// `ATP` operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinOp {
    /// `ATPO=d`: make the pin an output.
    Output,
    /// `ATPI=d`: make the pin an input.
    Input,
    /// `ATPR=d`: read an input pin.
    Read,
    /// `ATPC=d,v`: drive an output pin.
    Write(u8),
}

/// Classify a finished, upper-cased line.
pub fn parse_line(line: &str) -> Line<'_> {
    if line.starts_with("RT") {
        return parse_remote(line);
    }
    if line.starts_with("AT") {
        return Line::At(parse_at(line.as_bytes()));
    }
    Line::Ignored
}

fn parse_remote(line: &str) -> Line<'_> {
    // The address separator is searched from the fourth character on.
    let comma = line
        .bytes()
        .enumerate()
        .skip(3)
        .find(|&(_, b)| b == b',')
        .map(|(i, _)| i);

    match comma {
        Some(i) => {
            let mut cursor = Cursor::new(line.as_bytes(), i + 1);
            let destination = cursor.number().and_then(|n| {
                u16::try_from(n)
                    .map(Destination::from)
                    .map_err(|_| AtError::OutOfRange {
                        index: n,
                        max: u32::from(u16::MAX),
                    })
            });
            Line::Remote {
                destination,
                command: &line[2..i],
            }
        }
        None => Line::Remote {
            destination: Ok(Destination::Broadcast),
            command: line.get(2..).unwrap_or(""),
        },
    }
}

fn parse_at(bytes: &[u8]) -> AtResult<AtCommand> {
    match bytes.get(2) {
        None => Ok(AtCommand::Attention),
        Some(b'&') => parse_ampersand(bytes),
        Some(b'+') => parse_plus(bytes),
        Some(b'I') => parse_info(bytes),
        Some(b'P') => parse_pin(bytes),
        Some(b'S') => parse_register(bytes),
        Some(b'O') => Ok(AtCommand::Online),
        Some(b'Z') => Ok(AtCommand::Reset),
        Some(_) => Err(AtError::Syntax),
    }
}

fn parse_ampersand(bytes: &[u8]) -> AtResult<AtCommand> {
    let suffix = bytes.get(4..).unwrap_or(&[]);
    match bytes.get(3) {
        Some(b'F') => Ok(AtCommand::FactoryReset),
        Some(b'W') => Ok(AtCommand::Save),
        Some(b'U') if suffix == b"PDATE" => Ok(AtCommand::ForceUpdate),
        Some(b'T') => match suffix {
            b"" => Ok(AtCommand::TestMode(TestModeChange::ClearAll)),
            b"=RSSI" => Ok(AtCommand::TestMode(TestModeChange::Toggle(TestMode::RSSI))),
            b"=TDM" => Ok(AtCommand::TestMode(TestModeChange::Toggle(TestMode::TDM))),
            _ => Err(AtError::Syntax),
        },
        _ => Err(AtError::Syntax),
    }
}

fn parse_plus(bytes: &[u8]) -> AtResult<AtCommand> {
    match bytes.get(3) {
        Some(b'P') => {
            if bytes.get(4) != Some(&b'=') {
                return Err(AtError::Syntax);
            }
            let value = Cursor::new(bytes, 5).number()?;
            Ok(AtCommand::PowerLevel(value))
        }
        Some(b'C') => {
            let mut cursor = Cursor::new(bytes, 4);
            let channel = cursor.number()?;
            match cursor.next() {
                Some(b'?') => Ok(AtCommand::CalibrationRead(channel)),
                Some(b'=') => {
                    let value = cursor.number()?;
                    Ok(AtCommand::CalibrationWrite { channel, value })
                }
                _ => Err(AtError::Syntax),
            }
        }
        Some(b'L') => Ok(AtCommand::CalibrationLock),
        _ => Err(AtError::Syntax),
    }
}

fn parse_info(bytes: &[u8]) -> AtResult<AtCommand> {
    let query = match bytes.get(3) {
        None | Some(b'0') => InfoQuery::Banner,
        Some(b'1') => InfoQuery::Version,
        Some(b'2') => InfoQuery::BoardId,
        Some(b'3') => InfoQuery::Frequency,
        Some(b'4') => InfoQuery::Bootloader,
        Some(b'5') => InfoQuery::Parameters,
        Some(b'6') => InfoQuery::Timing,
        Some(b'7') => InfoQuery::Signal,
        Some(b'8') => InfoQuery::Sync,
        Some(_) => return Err(AtError::Syntax),
    };
    Ok(AtCommand::Info(query))
}

fn parse_pin(bytes: &[u8]) -> AtResult<AtCommand> {
    if bytes.get(3) == Some(&b'P') {
        return Ok(AtCommand::PinList);
    }
    if bytes.get(4) != Some(&b'=') {
        return Err(AtError::Syntax);
    }
    let pin = digit_at(bytes, 5)?;

    let op = match bytes.get(3) {
        Some(b'O') => PinOp::Output,
        Some(b'I') => PinOp::Input,
        Some(b'R') => PinOp::Read,
        // ATPC=d,v: the value sits at a fixed position after the separator.
        Some(b'C') => PinOp::Write(digit_at(bytes, 7)?),
        _ => return Err(AtError::Syntax),
    };
    Ok(AtCommand::Pin { pin, op })
}

fn parse_register(bytes: &[u8]) -> AtResult<AtCommand> {
    let mut cursor = Cursor::new(bytes, 3);
    let index = cursor.number()?;
    match cursor.next() {
        Some(b'?') => Ok(AtCommand::ParamRead(index)),
        Some(b'=') => {
            let value = cursor.number()?;
            Ok(AtCommand::ParamWrite { index, value })
        }
        _ => Err(AtError::Syntax),
    }
}

fn digit_at(bytes: &[u8], pos: usize) -> AtResult<u8> {
    match bytes.get(pos) {
        Some(b) if b.is_ascii_digit() => Ok(b - b'0'),
        _ => Err(AtError::Syntax),
    }
}

/// Read position while decoding numeric arguments of one line.
#[derive(Debug)]
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8], pos: usize) -> Self {
        Cursor { bytes, pos }
    }

    /// Consume a run of decimal digits. An empty run reads as zero.
    fn number(&mut self) -> AtResult<u32> {
        let mut value: u32 = 0;
        while let Some(&b) = self.bytes.get(self.pos) {
            if !b.is_ascii_digit() {
                break;
            }
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(u32::from(b - b'0')))
                .ok_or(AtError::Syntax)?;
            self.pos += 1;
        }
        Ok(value)
    }

    fn next(&mut self) -> Option<u8> {
        let b = *self.bytes.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(line: &str) -> AtResult<AtCommand> {
        match parse_line(line) {
            Line::At(result) => result,
            other => panic!("expected AT line, got {:?}", other),
        }
    }

    #[test]
    fn test_families() {
        assert_eq!(parse_line("HELLO"), Line::Ignored);
        assert_eq!(parse_line("A"), Line::Ignored);
        assert_eq!(parse_line(""), Line::Ignored);
        assert_eq!(at("AT"), Ok(AtCommand::Attention));
        assert_eq!(at("ATX"), Err(AtError::Syntax));
        assert_eq!(at("AT "), Err(AtError::Syntax));
    }

    #[test]
    fn test_remote_with_destination() {
        assert_eq!(
            parse_line("RTAT,5"),
            Line::Remote {
                destination: Ok(Destination::Node(5)),
                command: "AT",
            }
        );
        assert_eq!(
            parse_line("RTATS3=7,12"),
            Line::Remote {
                destination: Ok(Destination::Node(12)),
                command: "ATS3=7",
            }
        );
    }

    #[test]
    fn test_remote_broadcast() {
        assert_eq!(
            parse_line("RTAT"),
            Line::Remote {
                destination: Ok(Destination::Broadcast),
                command: "AT",
            }
        );
        assert_eq!(
            parse_line("RTI5,65535"),
            Line::Remote {
                destination: Ok(Destination::Broadcast),
                command: "I5",
            }
        );
    }

    #[test]
    fn test_remote_destination_too_large() {
        match parse_line("RTAT,70000") {
            Line::Remote { destination, command } => {
                assert!(destination.is_err());
                assert_eq!(command, "AT");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_ampersand() {
        assert_eq!(at("AT&F"), Ok(AtCommand::FactoryReset));
        assert_eq!(at("AT&W"), Ok(AtCommand::Save));
        assert_eq!(at("AT&UPDATE"), Ok(AtCommand::ForceUpdate));
        assert_eq!(at("AT&UPDATES"), Err(AtError::Syntax));
        assert_eq!(at("AT&U"), Err(AtError::Syntax));
        assert_eq!(at("AT&T"), Ok(AtCommand::TestMode(TestModeChange::ClearAll)));
        assert_eq!(
            at("AT&T=RSSI"),
            Ok(AtCommand::TestMode(TestModeChange::Toggle(TestMode::RSSI)))
        );
        assert_eq!(
            at("AT&T=TDM"),
            Ok(AtCommand::TestMode(TestModeChange::Toggle(TestMode::TDM)))
        );
        assert_eq!(at("AT&T=FOO"), Err(AtError::Syntax));
        assert_eq!(at("AT&"), Err(AtError::Syntax));
        assert_eq!(at("AT&Q"), Err(AtError::Syntax));
    }

    #[test]
    fn test_plus() {
        assert_eq!(at("AT+P=200"), Ok(AtCommand::PowerLevel(200)));
        assert_eq!(at("AT+P200"), Err(AtError::Syntax));
        assert_eq!(at("AT+C3?"), Ok(AtCommand::CalibrationRead(3)));
        assert_eq!(
            at("AT+C12=300"),
            Ok(AtCommand::CalibrationWrite { channel: 12, value: 300 })
        );
        assert_eq!(at("AT+C3"), Err(AtError::Syntax));
        assert_eq!(at("AT+L"), Ok(AtCommand::CalibrationLock));
        assert_eq!(at("AT+X"), Err(AtError::Syntax));
    }

    #[test]
    fn test_info() {
        assert_eq!(at("ATI"), Ok(AtCommand::Info(InfoQuery::Banner)));
        assert_eq!(at("ATI0"), Ok(AtCommand::Info(InfoQuery::Banner)));
        assert_eq!(at("ATI5"), Ok(AtCommand::Info(InfoQuery::Parameters)));
        assert_eq!(at("ATI8"), Ok(AtCommand::Info(InfoQuery::Sync)));
        assert_eq!(at("ATI9"), Err(AtError::Syntax));
    }

    #[test]
    fn test_pins() {
        assert_eq!(at("ATPP"), Ok(AtCommand::PinList));
        assert_eq!(at("ATPO=3"), Ok(AtCommand::Pin { pin: 3, op: PinOp::Output }));
        assert_eq!(at("ATPI=0"), Ok(AtCommand::Pin { pin: 0, op: PinOp::Input }));
        assert_eq!(at("ATPR=9"), Ok(AtCommand::Pin { pin: 9, op: PinOp::Read }));
        assert_eq!(at("ATPC=2,1"), Ok(AtCommand::Pin { pin: 2, op: PinOp::Write(1) }));
        assert_eq!(at("ATPC=2"), Err(AtError::Syntax));
        assert_eq!(at("ATPO3"), Err(AtError::Syntax));
        assert_eq!(at("ATPO=X"), Err(AtError::Syntax));
        assert_eq!(at("ATPX=1"), Err(AtError::Syntax));
    }

    #[test]
    fn test_registers() {
        assert_eq!(at("ATS0?"), Ok(AtCommand::ParamRead(0)));
        assert_eq!(at("ATS12?"), Ok(AtCommand::ParamRead(12)));
        assert_eq!(at("ATS3=25"), Ok(AtCommand::ParamWrite { index: 3, value: 25 }));
        assert_eq!(at("ATS3"), Err(AtError::Syntax));
        assert_eq!(at("ATS3!"), Err(AtError::Syntax));
        assert_eq!(at("ATS3=99999999999"), Err(AtError::Syntax));
    }

    #[test]
    fn test_online_and_reset() {
        assert_eq!(at("ATO"), Ok(AtCommand::Online));
        assert_eq!(at("ATZ"), Ok(AtCommand::Reset));
    }

    #[test]
    fn test_family_labels() {
        assert_eq!(AtCommand::ParamRead(1).family(), "register");
        assert_eq!(AtCommand::CalibrationLock.family(), "plus");
        assert_eq!(AtCommand::Info(InfoQuery::Banner).family(), "info");
    }
}
