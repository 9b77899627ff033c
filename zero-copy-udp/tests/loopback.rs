mod suite;

use std::net::UdpSocket;
use std::thread;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use zero_copy_udp::{Transport, TransportConfig, create_transport};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn with_echo<F>(config: TransportConfig, test: F)
where
    F: FnOnce(&Transport),
{
    init_logger();
    let echo_socket = suite::udp_echo::bind_echo().unwrap();
    let port = echo_socket.local_addr().unwrap().port();
    let token = CancellationToken::new();
    let echo = {
        let token = token.clone();
        thread::spawn(move || suite::udp_echo::run_echo(echo_socket, token))
    };
    let transport = create_transport("127.0.0.1", &port.to_string(), Some(config)).unwrap();
    test(&transport);
    token.cancel();
    echo.join().unwrap().unwrap();
}

#[test]
fn default_transport_round_trips_full_frames() {
    with_echo(TransportConfig::default(), |transport| {
        assert_eq!(transport.num_recv_frames(), zero_copy_udp::DEFAULT_NUM_FRAMES);
        assert_eq!(transport.recv_frame_size(), zero_copy_udp::UDP_MTU);
        for len in [0, 1, 10, 512, transport.send_frame_size()] {
            let mut buff = transport.get_send_buff(Duration::ZERO).unwrap();
            for (dst, src) in buff.iter_mut().zip(suite::udp_echo::pattern(len, len)) {
                *dst = src;
            }
            buff.commit(len).unwrap();

            let echo = transport.get_recv_buff(Duration::from_secs(2)).unwrap().unwrap();
            assert_eq!(echo.len(), len);
            assert!(echo.iter().copied().eq(suite::udp_echo::pattern(len, len)));
        }
    });
}

#[test]
fn loans_never_exceed_pool_depth() {
    let config: TransportConfig = "num_recv_frames=3,num_send_frames=3".parse().unwrap();
    with_echo(config, |transport| {
        for _ in 0..6 {
            transport.get_send_buff(Duration::ZERO).unwrap().commit(2).unwrap();
        }
        let mut held = Vec::new();
        for _ in 0..6 {
            if let Some(buff) = transport.get_recv_buff(Duration::from_millis(500)).unwrap() {
                held.push(buff);
            }
            assert!(held.len() <= transport.num_recv_frames());
        }
        assert_eq!(held.len(), 3);
        assert_eq!(transport.stats().free_recv_frames, 0);

        held.clear();
        let mut drained = 0;
        while let Some(buff) = transport.get_recv_buff(Duration::from_millis(200)).unwrap() {
            assert_eq!(buff.len(), 2);
            drained += 1;
        }
        assert_eq!(drained, 3);
        assert_eq!(transport.stats().free_recv_frames, 3);
    });
}

#[test]
fn ignores_datagrams_from_other_sources() {
    with_echo(TransportConfig::default(), |transport| {
        let stranger = UdpSocket::bind("127.0.0.1:0").unwrap();
        stranger.send_to(b"noise", transport.local_addr().unwrap()).unwrap();
        assert!(transport.get_recv_buff(Duration::from_millis(100)).unwrap().is_none());
    });
}
