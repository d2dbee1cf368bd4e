use hickory_proto::op::{Message, MessageType};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{RData, Record};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::oneshot;

pub const MOCK_ANSWER: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 34);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockMode {
    /// Answer every query with a single A record.
    Answer,
    /// UDP replies are truncated with no answers; TCP answers normally.
    TruncateUdp,
    /// Replies carry an ID different from the query's.
    WrongId,
    /// Never reply.
    Silent,
}

/// Loopback DNS server listening on the same port for UDP and TCP.
pub struct MockDnsServer {
    addr: SocketAddr,
    udp_queries: Arc<AtomicUsize>,
    tcp_queries: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start(mode: MockMode) -> std::io::Result<Self> {
        let socket = UdpSocket::bind("127.0.0.1:0").await?;
        let addr = socket.local_addr()?;
        let listener = TcpListener::bind(addr).await?;

        let udp_queries = Arc::new(AtomicUsize::new(0));
        let tcp_queries = Arc::new(AtomicUsize::new(0));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let udp_count = udp_queries.clone();
        let tcp_count = tcp_queries.clone();
        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = socket.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            udp_count.fetch_add(1, Ordering::SeqCst);
                            if let Some(response) = Self::respond(&buf[..len], mode, true) {
                                let _ = socket.send_to(&response, peer).await;
                            }
                        }
                    }
                    accepted = listener.accept() => {
                        if let Ok((mut stream, _)) = accepted {
                            tcp_count.fetch_add(1, Ordering::SeqCst);
                            tokio::spawn(async move {
                                let mut len_buf = [0u8; 2];
                                if stream.read_exact(&mut len_buf).await.is_err() {
                                    return;
                                }
                                let mut query = vec![0u8; u16::from_be_bytes(len_buf) as usize];
                                if stream.read_exact(&mut query).await.is_err() {
                                    return;
                                }
                                match Self::respond(&query, mode, false) {
                                    Some(response) => {
                                        let len = (response.len() as u16).to_be_bytes();
                                        let _ = stream.write_all(&len).await;
                                        let _ = stream.write_all(&response).await;
                                    }
                                    // hold the connection open until the client gives up
                                    None => {
                                        let _ = stream.read(&mut [0u8; 1]).await;
                                    }
                                }
                            });
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            udp_queries,
            tcp_queries,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn spec(&self, transport: &str) -> ferrous_doh_domain::UpstreamSpec {
        format!("{}:{}", transport, self.addr)
            .parse()
            .expect("valid upstream spec")
    }

    pub fn udp_queries(&self) -> usize {
        self.udp_queries.load(Ordering::SeqCst)
    }

    pub fn tcp_queries(&self) -> usize {
        self.tcp_queries.load(Ordering::SeqCst)
    }

    fn respond(query: &[u8], mode: MockMode, over_udp: bool) -> Option<Vec<u8>> {
        if mode == MockMode::Silent {
            return None;
        }
        let query = Message::from_vec(query).ok()?;

        let mut response = Message::new();
        response
            .set_id(query.id())
            .set_message_type(MessageType::Response)
            .set_op_code(query.op_code())
            .set_recursion_desired(query.recursion_desired())
            .set_recursion_available(true)
            .add_queries(query.queries().to_vec());

        match mode {
            MockMode::TruncateUdp if over_udp => {
                response.set_truncated(true);
            }
            MockMode::WrongId => {
                response.set_id(query.id().wrapping_add(1));
                Self::add_answer(&mut response, &query);
            }
            _ => Self::add_answer(&mut response, &query),
        }

        response.to_vec().ok()
    }

    fn add_answer(response: &mut Message, query: &Message) {
        if let Some(q) = query.queries().first() {
            response.add_answer(Record::from_rdata(
                q.name().clone(),
                60,
                RData::A(A::from(MOCK_ANSWER)),
            ));
        }
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
