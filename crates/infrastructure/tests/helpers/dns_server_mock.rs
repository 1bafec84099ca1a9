#![allow(dead_code)]
use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{RData, Record};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::oneshot;

/// Endereço devolvido nas respostas UDP
pub const UDP_ANSWER: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 34);
/// Endereço devolvido nas respostas TCP
pub const TCP_ANSWER: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 35);

/// Como o servidor mock responde
#[derive(Debug, Clone, Copy)]
pub struct MockBehaviour {
    pub rcode: ResponseCode,
    /// Responde via UDP com TC=1 e sem registros
    pub truncate_udp: bool,
    /// Envia antes um datagrama com ID errado
    pub stray_datagram: bool,
    pub delay: Duration,
}

impl Default for MockBehaviour {
    fn default() -> Self {
        Self {
            rcode: ResponseCode::NoError,
            truncate_udp: false,
            stray_datagram: false,
            delay: Duration::ZERO,
        }
    }
}

/// Mock de servidor DNS (UDP + TCP na mesma porta) para testes
///
/// Responde a qualquer pergunta com um registro A fixo.
pub struct MockDnsServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    /// Inicia um servidor mock numa porta escolhida pelo sistema
    pub async fn start(behaviour: MockBehaviour) -> Result<Self, std::io::Error> {
        let socket = UdpSocket::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = socket.local_addr()?;
        let listener = TcpListener::bind(addr).await?;

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    result = socket.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            tokio::time::sleep(behaviour.delay).await;
                            if let Some(response) = Self::build_response(&buf[..len], behaviour, false) {
                                if behaviour.stray_datagram {
                                    let mut stray = response.clone();
                                    stray[0] ^= 0xff;
                                    let _ = socket.send_to(&stray, peer).await;
                                }
                                let _ = socket.send_to(&response, peer).await;
                            }
                        }
                    }
                    accepted = listener.accept() => {
                        if let Ok((mut stream, _)) = accepted {
                            tokio::spawn(async move {
                                let Ok(len) = stream.read_u16().await else { return };
                                let mut query = vec![0u8; len as usize];
                                if stream.read_exact(&mut query).await.is_err() {
                                    return;
                                }
                                if let Some(response) = Self::build_response(&query, behaviour, true) {
                                    let mut frame = (response.len() as u16).to_be_bytes().to_vec();
                                    frame.extend_from_slice(&response);
                                    let _ = stream.write_all(&frame).await;
                                }
                            });
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Endereço do servidor
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn build_response(query: &[u8], behaviour: MockBehaviour, over_tcp: bool) -> Option<Vec<u8>> {
        let request = Message::from_vec(query).ok()?;
        let mut response = request.clone();
        response
            .set_message_type(MessageType::Response)
            .set_recursion_available(true)
            .set_response_code(behaviour.rcode);

        if behaviour.truncate_udp && !over_tcp {
            response.set_truncated(true);
        } else if behaviour.rcode == ResponseCode::NoError {
            let name = request.queries().first()?.name().clone();
            let ip = if over_tcp { TCP_ANSWER } else { UDP_ANSWER };
            response.add_answer(Record::from_rdata(name, 60, RData::A(A::from(ip))));
        }

        response.to_vec().ok()
    }

    /// Para o servidor
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
