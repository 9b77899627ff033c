//! # Transport Creation
//!
//! ## Purpose
//!
//! This file turns an address, a port and a `TransportConfig` into a ready `Transport`:
//! a connected UDP socket plus both frame pools with every frame already free.
//!
//! ## How it works
//!
//! 1.  Validates the configuration.
//! 2.  Resolves the peer to an IPv4 endpoint (`resolve.rs`).
//! 3.  Creates a datagram socket with `libc::socket` and connects it to the peer, so
//!     the kernel filters out datagrams from any other source.
//! 4.  Builds the receive and send lanes, which maps each frame pool once and seeds
//!     its free-list.
//! 5.  Applies the requested socket buffer sizes. A shortfall only logs a warning.
//!
//! Any failure in steps 1-4 aborts creation; the socket is closed by `OwnedFd`.
//!
//! ## Main components
//!
//! - `create_transport()`: convenience entry point with an optional config.
//! - `Transport::new()`: the constructor.
//! - `connect_socket()`: socket creation and connection.

use crate::config::TransportConfig;
use crate::lane::FrameLane;
use crate::resolve::{resolve_ipv4, sockaddr_in};
use crate::socket::Transport;
use crate::sockopt::{SockBuf, resize_buff_helper};
use std::io;
use std::mem::size_of;
use std::net::SocketAddrV4;
use std::os::fd::{AsRawFd as _, FromRawFd as _, OwnedFd};

/// Creates a transport connected to `addr`:`port`.
///
/// `port` is either a number or a service name. `None` uses `TransportConfig::default()`.
pub fn create_transport(
    addr: &str,
    port: &str,
    config: Option<TransportConfig>,
) -> io::Result<Transport> {
    Transport::new(addr, port, &config.unwrap_or_default())
}

impl Transport {
    pub fn new(addr: &str, port: &str, config: &TransportConfig) -> io::Result<Self> {
        config.validate()?;
        let peer = resolve_ipv4(addr, port)?;
        log::debug!("Creating udp transport for {addr} {port} ({peer})");

        let fd = connect_socket(peer)?;

        let recv = FrameLane::new(config.num_recv_frames, config.recv_frame_size, config.huge_page)?;
        let send = FrameLane::new(config.num_send_frames, config.send_frame_size, config.huge_page)?;

        let raw_fd = fd.as_raw_fd();
        resize_buff_helper(raw_fd, SockBuf::Recv, config.recv_buff_size);
        resize_buff_helper(raw_fd, SockBuf::Send, config.send_buff_size);

        Ok(Self {
            fd,
            peer,
            recv,
            send,
        })
    }
}

/// Opens an IPv4 datagram socket and connects it to `peer`.
pub fn connect_socket(peer: SocketAddrV4) -> io::Result<OwnedFd> {
    let fd = unsafe {
        let fd = libc::socket(libc::AF_INET, libc::SOCK_DGRAM | libc::SOCK_CLOEXEC, 0);
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        OwnedFd::from_raw_fd(fd)
    };

    let sin = sockaddr_in(peer);
    if unsafe {
        libc::connect(
            fd.as_raw_fd(),
            &sin as *const _ as *const libc::sockaddr,
            size_of::<libc::sockaddr_in>() as libc::socklen_t,
        ) < 0
    } {
        return Err(io::Error::other(format!(
            "Failed to connect to {peer}: {}",
            io::Error::last_os_error()
        )));
    }
    Ok(fd)
}
