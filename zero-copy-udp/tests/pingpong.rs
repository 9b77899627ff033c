//
// pingpong.rs - Round trip through a UDP echo peer
//
// Purpose:
//   Checks that frames committed on the send path come back byte for byte on the receive
//   path of the same transport, across a range of payload sizes and with frames being
//   recycled many times over.
//
// How it works:
//   - An echo peer runs on a blocking tokio task and stops when its token is cancelled.
//   - The pinger, on its own blocking task, commits one frame per round, waits for the
//     echo and compares it with what was sent.
//

pub mod suite;

use std::io::{self, Result};
use std::time::Duration;
use zero_copy_udp::{TransportConfig, create_transport};

const ROUNDS: usize = 200;

fn ping(port: u16) -> Result<()> {
    let config: TransportConfig = "num_recv_frames=4,num_send_frames=4,huge_page=0".parse()?;
    let transport = create_transport("127.0.0.1", &port.to_string(), Some(config))?;
    let frame_size = transport.send_frame_size().min(transport.recv_frame_size());
    for seq in 0..ROUNDS {
        let len = (seq * 37) % (frame_size + 1);
        let mut buff = transport
            .get_send_buff(Duration::from_secs(1))
            .ok_or_else(|| io::Error::other("no send frame"))?;
        for (dst, src) in buff.iter_mut().zip(suite::udp_echo::pattern(seq, len)) {
            *dst = src;
        }
        buff.commit(len)?;

        let echo = transport
            .get_recv_buff(Duration::from_secs(2))?
            .ok_or_else(|| io::Error::other(format!("round {seq}: no echo")))?;
        if echo.len() != len || !echo.iter().copied().eq(suite::udp_echo::pattern(seq, len)) {
            return Err(io::Error::other(format!(
                "round {seq}: sent {len} bytes, got {} back",
                echo.len()
            )));
        }
        echo.release();
    }
    let stats = transport.stats();
    log::info!("{ROUNDS} rounds done, {stats:?}");
    if stats.recv_evictions != 0 || stats.send_evictions != 0 {
        return Err(io::Error::other("free-list evicted frames"));
    }
    Ok(())
}

#[tokio::main]
pub async fn main() -> Result<()> {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .is_test(true)
        .try_init();

    let echo_socket = suite::udp_echo::bind_echo()?;
    let port = echo_socket.local_addr()?.port();
    let shutdown = tokio_util::sync::CancellationToken::new();
    let token = shutdown.clone();
    let echo = tokio::task::spawn_blocking(move || suite::udp_echo::run_echo(echo_socket, token));

    let pinger = tokio::task::spawn_blocking(move || ping(port));
    let result = pinger.await?;
    shutdown.cancel();
    let echoed = echo.await??;

    if let Err(e) = result {
        log::error!("Pingpong test failed: {e}");
        Err(e)
    } else {
        log::info!("Pingpong test passed, {echoed} datagrams echoed.");
        Ok(())
    }
}
