//! Resolves a host and a port or service name to one IPv4 UDP endpoint with
//! `getaddrinfo`, so `"domain"` works as well as `"53"`.

use std::ffi::{CStr, CString};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::{io, mem, ptr};

pub fn resolve_ipv4(addr: &str, port: &str) -> io::Result<SocketAddrV4> {
    let host = CString::new(addr).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("invalid host name {addr:?}"))
    })?;
    let service = CString::new(port).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("invalid port {port:?}"))
    })?;

    let mut hints: libc::addrinfo = unsafe { mem::zeroed() };
    hints.ai_family = libc::AF_INET;
    hints.ai_socktype = libc::SOCK_DGRAM;
    hints.ai_protocol = libc::IPPROTO_UDP;

    let mut list: *mut libc::addrinfo = ptr::null_mut();
    let rc = unsafe { libc::getaddrinfo(host.as_ptr(), service.as_ptr(), &hints, &mut list) };
    if rc != 0 {
        let reason = if rc == libc::EAI_SYSTEM {
            io::Error::last_os_error().to_string()
        } else {
            unsafe { CStr::from_ptr(libc::gai_strerror(rc)) }
                .to_string_lossy()
                .into_owned()
        };
        return Err(io::Error::other(format!(
            "Failed to resolve {addr}:{port}: {reason}"
        )));
    }

    let mut endpoint = None;
    let mut cursor = list;
    while !cursor.is_null() {
        let info = unsafe { &*cursor };
        if info.ai_family == libc::AF_INET && !info.ai_addr.is_null() {
            let sin = unsafe { &*(info.ai_addr as *const libc::sockaddr_in) };
            endpoint = Some(from_sockaddr_in(sin));
            break;
        }
        cursor = info.ai_next;
    }
    unsafe { libc::freeaddrinfo(list) };

    endpoint.ok_or_else(|| io::Error::other(format!("No IPv4 address found for {addr}:{port}")))
}

pub(crate) fn sockaddr_in(endpoint: SocketAddrV4) -> libc::sockaddr_in {
    let mut sin: libc::sockaddr_in = unsafe { mem::zeroed() };
    sin.sin_family = libc::AF_INET as libc::sa_family_t;
    sin.sin_port = endpoint.port().to_be();
    sin.sin_addr = libc::in_addr {
        s_addr: u32::from(*endpoint.ip()).to_be(),
    };
    sin
}

pub(crate) fn from_sockaddr_in(sin: &libc::sockaddr_in) -> SocketAddrV4 {
    SocketAddrV4::new(
        Ipv4Addr::from(u32::from_be(sin.sin_addr.s_addr)),
        u16::from_be(sin.sin_port),
    )
}
