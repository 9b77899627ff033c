//
// socket.rs - Zero-copy UDP transport
//
// Purpose:
//   Owns everything one logical connection needs: the connected datagram socket and one
//   frame lane per direction. Receive and send handles borrow the transport, so it
//   cannot be dropped while a frame is on loan.
//
// How it works:
//   - Construction lives in create.rs, the receive path in recv.rs, the send path and
//     commit in send.rs, and the timed wait in poll.rs.
//   - Dropping the transport closes the socket and unmaps both frame pools.
//
// Main components:
//   - Transport: the socket plus the receive and send lanes.
//   - TransportStats: free-list occupancy and eviction counters.
//

use crate::lane::{RecvLane, SendLane};
use crate::resolve::from_sockaddr_in;
use crate::sockopt::SockBuf;
use std::net::SocketAddrV4;
use std::os::fd::{AsFd, AsRawFd as _, BorrowedFd, OwnedFd};
use std::{fmt, io, mem};

pub struct Transport {
    pub(crate) fd: OwnedFd,
    pub(crate) peer: SocketAddrV4,
    pub(crate) recv: RecvLane,
    pub(crate) send: SendLane,
}

static_assertions::assert_impl_all!(Transport: Send, Sync);

/// A snapshot of the free-lists of both directions.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct TransportStats {
    pub free_recv_frames: usize,
    pub free_send_frames: usize,
    /// Entries dropped because a push found the receive free-list full.
    pub recv_evictions: u64,
    /// Entries dropped because a push found the send free-list full.
    pub send_evictions: u64,
}

impl Transport {
    pub fn num_recv_frames(&self) -> usize {
        self.recv.num_frames()
    }

    pub fn recv_frame_size(&self) -> usize {
        self.recv.frame_size()
    }

    pub fn num_send_frames(&self) -> usize {
        self.send.num_frames()
    }

    pub fn send_frame_size(&self) -> usize {
        self.send.frame_size()
    }

    /// The endpoint the socket is connected to.
    pub fn peer_addr(&self) -> SocketAddrV4 {
        self.peer
    }

    /// The local endpoint the socket was bound to when it connected.
    pub fn local_addr(&self) -> io::Result<SocketAddrV4> {
        let mut sin: libc::sockaddr_in = unsafe { mem::zeroed() };
        let mut len = mem::size_of::<libc::sockaddr_in>() as libc::socklen_t;
        if unsafe {
            libc::getsockname(
                self.fd.as_raw_fd(),
                &mut sin as *mut _ as *mut libc::sockaddr,
                &mut len,
            )
        } < 0
        {
            return Err(io::Error::last_os_error());
        }
        Ok(from_sockaddr_in(&sin))
    }

    /// Kernel receive buffer size currently in effect.
    pub fn recv_buff_size(&self) -> io::Result<usize> {
        SockBuf::Recv.get(self.fd.as_raw_fd())
    }

    /// Kernel send buffer size currently in effect.
    pub fn send_buff_size(&self) -> io::Result<usize> {
        SockBuf::Send.get(self.fd.as_raw_fd())
    }

    /// Requests a new kernel buffer size and returns the size actually applied.
    pub fn resize_buff(&self, which: SockBuf, num_bytes: usize) -> io::Result<usize> {
        which.resize(self.fd.as_raw_fd(), num_bytes)
    }

    pub fn stats(&self) -> TransportStats {
        TransportStats {
            free_recv_frames: self.recv.num_free(),
            free_send_frames: self.send.num_free(),
            recv_evictions: self.recv.evictions(),
            send_evictions: self.send.evictions(),
        }
    }
}

impl AsFd for Transport {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("fd", &self.fd.as_raw_fd())
            .field("peer", &self.peer)
            .field("num_recv_frames", &self.num_recv_frames())
            .field("recv_frame_size", &self.recv_frame_size())
            .field("num_send_frames", &self.num_send_frames())
            .field("send_frame_size", &self.send_frame_size())
            .finish()
    }
}
