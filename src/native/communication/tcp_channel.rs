use super::{KrbChannel, TransportProtocol};
use std::io;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

const TIMEOUT_SECS: u64 = 5;

/// Send Kerberos messages over TCP, each one prefixed by its length
#[derive(Debug)]
pub struct TcpChannel {
    dst_addr: SocketAddr,
}

impl TcpChannel {
    pub fn new(dst_addr: SocketAddr) -> Self {
        return Self { dst_addr };
    }
}

impl KrbChannel for TcpChannel {
    fn send_recv(&self, raw: &[u8]) -> io::Result<Vec<u8>> {
        return send_recv_tcp(&self.dst_addr, raw);
    }

    fn protocol(&self) -> TransportProtocol {
        return TransportProtocol::TCP;
    }

    fn address(&self) -> SocketAddr {
        return self.dst_addr;
    }
}

pub fn send_recv_tcp(dst_addr: &SocketAddr, raw: &[u8]) -> io::Result<Vec<u8>> {
    let timeout = Duration::from_secs(TIMEOUT_SECS);
    let mut tcp_stream = TcpStream::connect_timeout(dst_addr, timeout)?;
    tcp_stream.set_read_timeout(Some(timeout))?;

    tcp_stream.write_all(&set_size_header_to_request(raw))?;

    let mut len_data_bytes = [0 as u8; 4];
    tcp_stream.read_exact(&mut len_data_bytes)?;
    let data_length = u32::from_be_bytes(len_data_bytes);

    let mut raw_response: Vec<u8> = vec![0; data_length as usize];
    tcp_stream.read_exact(&mut raw_response)?;

    return Ok(raw_response);
}

fn set_size_header_to_request(raw_request: &[u8]) -> Vec<u8> {
    let request_length = raw_request.len() as u32;
    let mut raw_sized_request: Vec<u8> = request_length.to_be_bytes().to_vec();
    raw_sized_request.extend_from_slice(raw_request);

    return raw_sized_request;
}
