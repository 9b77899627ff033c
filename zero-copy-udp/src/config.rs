//! # Transport Configuration
//!
//! ## Purpose
//!
//! Holds the frame geometry and socket buffer sizes a transport is created with, and
//! reads them from device-address hints such as
//! `"recv_frame_size=8000,num_recv_frames=64,recv_buff_size=50e6"`.
//!
//! ## How it works
//!
//! Hint values are parsed as floating point and truncated, so scientific notation is
//! accepted for byte counts. Keys that are not transport options are skipped, since a
//! device address carries keys for other layers as well.
//!
//! ## Main components
//!
//! - `TransportConfig`: the configuration bundle.
//! - `DEFAULT_NUM_FRAMES`, `UDP_MTU`: defaults for frame counts and sizes.

use std::io;
use std::str::FromStr;

/// Frames per direction when not configured.
pub const DEFAULT_NUM_FRAMES: usize = 32;

/// Largest UDP payload that fits a 1500 byte Ethernet frame without fragmentation
/// (1500 minus the 20 byte IPv4 and 8 byte UDP headers).
pub const UDP_MTU: usize = 1500 - 20 - 8;

/// Configuration options for creating a `Transport`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Bytes per receive frame; longer datagrams are truncated.
    pub recv_frame_size: usize,
    /// Depth of the receive frame pool.
    pub num_recv_frames: usize,
    /// Bytes per send frame.
    pub send_frame_size: usize,
    /// Depth of the send frame pool.
    pub num_send_frames: usize,
    /// Requested `SO_RCVBUF` size; `0` leaves the OS default.
    pub recv_buff_size: usize,
    /// Requested `SO_SNDBUF` size; `0` leaves the OS default.
    pub send_buff_size: usize,
    /// Backs the frame pools with huge pages.
    ///
    /// - `Some(true)`: attempts to use huge pages.
    /// - `Some(false)`: uses standard pages.
    /// - `None`: huge pages only for pools of at least one huge page, if any are free.
    pub huge_page: Option<bool>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            recv_frame_size: UDP_MTU,
            num_recv_frames: DEFAULT_NUM_FRAMES,
            send_frame_size: UDP_MTU,
            num_send_frames: DEFAULT_NUM_FRAMES,
            recv_buff_size: 0,
            send_buff_size: 0,
            huge_page: None,
        }
    }
}

impl TransportConfig {
    /// Builds a configuration from `key, value` hints on top of the defaults.
    pub fn from_hints<'a, I>(hints: I) -> io::Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = Self::default();
        for (key, value) in hints {
            config.apply_hint(key.trim(), value.trim())?;
        }
        Ok(config)
    }

    fn apply_hint(&mut self, key: &str, value: &str) -> io::Result<()> {
        let field = match key {
            "recv_frame_size" => &mut self.recv_frame_size,
            "num_recv_frames" => &mut self.num_recv_frames,
            "send_frame_size" => &mut self.send_frame_size,
            "num_send_frames" => &mut self.num_send_frames,
            "recv_buff_size" => &mut self.recv_buff_size,
            "send_buff_size" => &mut self.send_buff_size,
            "huge_page" => {
                self.huge_page = Some(parse_flag(key, value)?);
                return Ok(());
            }
            _ => {
                log::debug!("ignoring hint {key}={value}");
                return Ok(());
            }
        };
        *field = parse_size(key, value)?;
        Ok(())
    }

    /// Checks that both frame pools can be built.
    pub fn validate(&self) -> io::Result<()> {
        for (name, value) in [
            ("recv_frame_size", self.recv_frame_size),
            ("num_recv_frames", self.num_recv_frames),
            ("send_frame_size", self.send_frame_size),
            ("num_send_frames", self.num_send_frames),
        ] {
            if value == 0 {
                return Err(invalid(format!("{name} must be non-zero")));
            }
        }
        for (name, value) in [
            ("num_recv_frames", self.num_recv_frames),
            ("num_send_frames", self.num_send_frames),
        ] {
            if u32::try_from(value).is_err() {
                return Err(invalid(format!("{name} = {value} is too large")));
            }
        }
        Ok(())
    }
}

/// Parses a comma separated `key=value` device address.
impl FromStr for TransportConfig {
    type Err = io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pairs = s
            .split(',')
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                pair.split_once('=')
                    .ok_or_else(|| invalid(format!("hint '{pair}' is not key=value")))
            })
            .collect::<io::Result<Vec<_>>>()?;
        Self::from_hints(pairs)
    }
}

fn parse_size(key: &str, value: &str) -> io::Result<usize> {
    let number: f64 = value
        .parse()
        .map_err(|e| invalid(format!("{key}: cannot parse '{value}': {e}")))?;
    if !number.is_finite() || number < 0.0 {
        return Err(invalid(format!("{key}: '{value}' is not a valid size")));
    }
    Ok(number as usize)
}

fn parse_flag(key: &str, value: &str) -> io::Result<bool> {
    match value {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(format!("{key}: '{value}' is not a boolean"))),
    }
}

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg)
}
