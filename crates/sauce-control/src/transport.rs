//! UDP transport (spec §4.6, §6.1): a receiving thread that decodes OSC
//! packets and dispatches them, and a sending thread that encodes outbound
//! telemetry/heartbeat packets back to the peer. Grounded on the teacher's
//! `modular_server::server::{start_recieving_server, start_sending_server}`
//! (since replaced by an HTTP/WebSocket transport in the teacher, but
//! exactly the shape spec §4.6 calls for here): one `UdpSocket` per
//! direction, `rosc::decoder`/`encoder` at the boundary, blocking `recv_from`
//! in a dedicated thread since only the control thread may block (spec §5).

use std::net::{SocketAddr, UdpSocket};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::Receiver;
use rosc::{decoder, encoder, OscPacket};

use crate::address::{self, Inbound};
use crate::errors::ControlIoError;
use crate::heartbeat::Heartbeat;
use sauce_core::message::TelemetryMessage;

/// Spawns the receiving thread: binds `bind_addr`, decodes every inbound
/// datagram, and calls `on_inbound` for each parsed event. `on_inbound`
/// must not block (spec §5) — it is expected to push into a lock-free
/// queue toward the audio thread, or record a heartbeat ack.
pub fn spawn_receiver(
    bind_addr: SocketAddr,
    mut on_inbound: impl FnMut(Inbound) + Send + 'static,
) -> Result<JoinHandle<()>, ControlIoError> {
    let socket = UdpSocket::bind(bind_addr).map_err(|source| ControlIoError::Bind { addr: bind_addr.to_string(), source })?;

    Ok(std::thread::spawn(move || {
        let mut buf = [0u8; decoder::MTU];
        loop {
            match socket.recv_from(&mut buf) {
                Ok((size, _peer)) => match decoder::decode(&buf[..size]) {
                    Ok(packet) => {
                        for event in address::parse_packet(&packet) {
                            on_inbound(event);
                        }
                    }
                    Err(err) => tracing::warn!(?err, "failed to decode OSC packet, dropping"),
                },
                Err(err) => {
                    tracing::error!(%err, "control socket recv error, receiver thread exiting");
                    return;
                }
            }
        }
    }))
}

/// Spawns the sending thread: drains `telemetry_rx` and `ack_rx` (the
/// latter fed by the receiver thread whenever an `/engine/pong` arrives,
/// since only this thread owns the `Heartbeat`'s missed-ack counter) and
/// runs the heartbeat cadence, encoding everything to `peer_addr` over one
/// outbound socket bound to an ephemeral port (spec §4.6, §6.1). Exits
/// when both channels' sender halves are dropped.
pub fn spawn_sender(
    peer_addr: SocketAddr,
    telemetry_rx: Receiver<TelemetryMessage>,
    ack_rx: Receiver<()>,
    mut heartbeat: Heartbeat,
) -> Result<JoinHandle<()>, ControlIoError> {
    let bind_addr: SocketAddr = "0.0.0.0:0".parse().expect("valid unspecified bind address");
    let socket = UdpSocket::bind(bind_addr).map_err(|source| ControlIoError::Bind { addr: bind_addr.to_string(), source })?;

    Ok(std::thread::spawn(move || loop {
        crossbeam_channel::select! {
            recv(telemetry_rx) -> message => match message {
                Ok(message) => send_packet(&socket, peer_addr, &address::telemetry_to_osc(&message)),
                Err(_) => return,
            },
            recv(ack_rx) -> ack => match ack {
                Ok(()) => heartbeat.record_ack(),
                Err(_) => return,
            },
            default(Duration::from_millis(50)) => {}
        }

        if heartbeat.should_ping(std::time::Instant::now()) {
            send_packet(&socket, peer_addr, &address::ping_packet());
        }
    }))
}

fn send_packet(socket: &UdpSocket, peer_addr: SocketAddr, packet: &OscPacket) {
    match encoder::encode(packet) {
        Ok(bytes) => {
            if let Err(err) = socket.send_to(&bytes, peer_addr) {
                tracing::warn!(%err, %peer_addr, "failed to send control packet");
            }
        }
        Err(err) => tracing::warn!(?err, "failed to encode outbound OSC packet"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heartbeat::SharedStatus;
    use crossbeam_channel::unbounded;
    use rosc::{OscMessage, OscType};
    use sauce_core::message::ControlMessage;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_receiver_decodes_and_dispatches_a_real_packet() {
        let bind_addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let listener = UdpSocket::bind(bind_addr).unwrap();
        let listen_addr = listener.local_addr().unwrap();
        drop(listener); // free the port for spawn_receiver to rebind

        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = received.clone();
        let handle = spawn_receiver(listen_addr, move |event| {
            received_clone.lock().unwrap().push(event);
        })
        .unwrap();

        std::thread::sleep(Duration::from_millis(20));
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        let packet = OscPacket::Message(OscMessage { addr: "/engine/bpm".into(), args: vec![OscType::Float(128.0)] });
        let bytes = encoder::encode(&packet).unwrap();
        sender.send_to(&bytes, listen_addr).unwrap();

        std::thread::sleep(Duration::from_millis(50));
        let events = received.lock().unwrap();
        assert_eq!(events.as_slice(), &[Inbound::Control(ControlMessage::EngineBpm(128.0))]);
        drop(handle); // receiver thread blocks on recv_from; process exit reclaims it
    }

    #[test]
    fn test_sender_emits_telemetry_and_pings() {
        let listen_addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let listener = UdpSocket::bind(listen_addr).unwrap();
        listener.set_read_timeout(Some(Duration::from_millis(500))).unwrap();
        let peer_addr = listener.local_addr().unwrap();

        let (tx, rx) = unbounded();
        let (_ack_tx, ack_rx) = unbounded();
        tx.send(TelemetryMessage::MasterLevel { peak: 0.5, rms: 0.2 }).unwrap();
        let heartbeat = Heartbeat::new(SharedStatus::new());
        let _handle = spawn_sender(peer_addr, rx, ack_rx, heartbeat).unwrap();

        let mut buf = [0u8; decoder::MTU];
        let (size, _) = listener.recv_from(&mut buf).unwrap();
        let packet = decoder::decode(&buf[..size]).unwrap();
        match packet {
            OscPacket::Message(m) => assert_eq!(m.addr, "/level/master"),
            _ => panic!("expected a message"),
        }
        drop(tx); // sender thread exits once the channel is closed and timers elapse
    }
}
