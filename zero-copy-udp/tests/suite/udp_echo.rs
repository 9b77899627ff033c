use std::io;
use std::net::UdpSocket;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Binds an echo peer on an ephemeral loopback port.
pub fn bind_echo() -> io::Result<UdpSocket> {
    let socket = UdpSocket::bind("127.0.0.1:0")?;
    socket.set_read_timeout(Some(Duration::from_millis(100)))?;
    log::debug!("[UDP_Echo] Bound to {}", socket.local_addr()?);
    Ok(socket)
}

/// Sends every datagram back to where it came from until `token` is cancelled.
///
/// Returns the number of datagrams echoed.
pub fn run_echo(socket: UdpSocket, token: CancellationToken) -> io::Result<usize> {
    let mut buffer = [0u8; 65536];
    let mut echoed = 0;
    loop {
        match socket.recv_from(&mut buffer) {
            Ok((number_of_bytes, src_addr)) => {
                log::trace!("[UDP_Echo] {} bytes from {}", number_of_bytes, src_addr);
                socket.send_to(&buffer[..number_of_bytes], src_addr)?;
                echoed += 1;
            }
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut => {
                if token.is_cancelled() {
                    break;
                }
            }
            Err(e) => {
                log::error!("[UDP_Echo] A network error occurred: {}", e);
                return Err(e);
            }
        }
    }
    Ok(echoed)
}

/// Deterministic payload of `len` bytes for round `seq`.
pub fn pattern(seq: usize, len: usize) -> impl Iterator<Item = u8> {
    (0..len).map(move |i| (seq.wrapping_mul(31).wrapping_add(i) % 251) as u8)
}
