//! End-to-end session replication: a host sequencer, issuing clients, a
//! lossy link.

mod common;

use command_engine::{
    parse_line, CommandFlags, CommandPacket, CommandRelay, GameCommandArg, ReceiveQueue,
    SessionError, SessionHost,
};
use command_engine::args::{TreePlacementArgs, TreeRemovalArgs};
use core_sim::state_digest;
use sim_schema::TilePos;

use common::{world, PLAYER};

const SCRIPT: &[&str] = &[
    "town 10 10",
    "industry 12 12 1",
    "tree 30 30 0",
    "loan 200000",
    "name-town 1 Coalbrook Vale",
    "hq 25 25",
    "raise 40 40",
    "rmtree 30 30",
];

#[test]
fn clients_converge_despite_reordered_delivery() {
    let mut host_world = world();
    let mut client = host_world.clone();
    let mut relay = CommandRelay::new();
    let mut host = SessionHost::new();
    let mut queue = ReceiveQueue::new();

    // The issuing client validates, the host sequences, and the client
    // commits each command through its own queue before the next line.
    let mut packets: Vec<CommandPacket> = Vec::new();
    for line in SCRIPT {
        let arg = parse_line(line).expect("script line parses");
        let result = relay
            .issue(&mut client, PLAYER, &arg, CommandFlags::APPLY)
            .expect("well-formed command");
        assert!(result.outcome.is_ok(), "{line} should validate");
        for request in relay.take_outgoing() {
            let packet = host
                .sequence(&mut host_world, request)
                .expect("well-formed request")
                .expect("request accepted");
            queue.insert(packet.clone()).expect("fresh packet");
            packets.push(packet);
        }
        queue.run_pending(&mut client).expect("session healthy");
    }
    assert_eq!(packets.len(), SCRIPT.len());
    assert_eq!(state_digest(&client), state_digest(&host_world));

    // A participant fed the same stream shuffled converges too; indices
    // restore the order.
    let mut shuffled: Vec<CommandPacket> = Vec::new();
    for chunk in packets.chunks(3) {
        let mut chunk: Vec<_> = chunk.to_vec();
        chunk.reverse();
        shuffled.extend(chunk);
    }

    let mut late = world();
    let mut late_queue = ReceiveQueue::new();
    let mut applied = 0;
    for packet in shuffled {
        let bytes = packet.encode_frame();
        let decoded = CommandPacket::decode_frame(&bytes).expect("frame decodes");
        late_queue.insert(decoded).expect("fresh packet");
        applied += late_queue.run_pending(&mut late).expect("session healthy");
    }
    assert_eq!(applied, SCRIPT.len());
    assert_eq!(state_digest(&late), state_digest(&host_world));
    assert_eq!(late, host_world);
}

#[test]
fn concurrent_issuers_get_distinct_indices_and_converge() {
    let mut host_world = world();
    let mut client_a = host_world.clone();
    let mut client_b = host_world.clone();
    let mut relay_a = CommandRelay::new();
    let mut relay_b = CommandRelay::new();
    let mut host = SessionHost::new();

    // Both clients issue before either has seen the other's command.
    let from_a = parse_line("industry 12 12 0").unwrap();
    let from_b = parse_line("tree 30 30 1").unwrap();
    let losing = parse_line("industry 12 12 2").unwrap();
    relay_a
        .issue(&mut client_a, PLAYER, &from_a, CommandFlags::APPLY)
        .unwrap();
    relay_b
        .issue(&mut client_b, PLAYER, &from_b, CommandFlags::APPLY)
        .unwrap();
    // B also grabs the tile A is about to take; that request validates on
    // B's world but loses the race at the host.
    relay_b
        .issue(&mut client_b, PLAYER, &losing, CommandFlags::APPLY)
        .unwrap();

    let mut packets: Vec<CommandPacket> = Vec::new();
    for request in relay_a
        .take_outgoing()
        .into_iter()
        .chain(relay_b.take_outgoing())
    {
        if let Some(packet) = host.sequence(&mut host_world, request).unwrap() {
            packets.push(packet);
        }
    }
    assert_eq!(packets.len(), 2);
    assert_eq!(packets[0].index, 0);
    assert_eq!(packets[1].index, 1);

    for client in [&mut client_a, &mut client_b] {
        let mut queue = ReceiveQueue::new();
        for packet in &packets {
            queue.insert(packet.clone()).unwrap();
        }
        assert_eq!(queue.run_pending(client).unwrap(), 2);
        assert_eq!(state_digest(client), state_digest(&host_world));
    }
}

#[test]
fn local_previews_do_not_perturb_the_session() {
    let mut host_world = world();
    let mut client = host_world.clone();
    let mut follower = host_world.clone();
    let mut relay = CommandRelay::new();
    let mut host = SessionHost::new();

    // The issuing client drags a ghost preview around before committing.
    // Only the committed command reaches the session.
    let preview = GameCommandArg::CreateTree(TreePlacementArgs {
        pos: TilePos::new(20, 20),
        object: 2,
    });
    relay
        .issue(
            &mut client,
            PLAYER,
            &preview,
            CommandFlags::APPLY | CommandFlags::GHOST,
        )
        .unwrap();
    relay
        .issue(
            &mut client,
            PLAYER,
            &GameCommandArg::RemoveTree(TreeRemovalArgs {
                pos: TilePos::new(20, 20),
            }),
            CommandFlags::APPLY | CommandFlags::GHOST,
        )
        .unwrap();
    relay
        .issue(&mut client, PLAYER, &preview, CommandFlags::APPLY)
        .unwrap();

    let mut requests = relay.take_outgoing();
    assert_eq!(requests.len(), 1);
    let packet = host
        .sequence(&mut host_world, requests.remove(0))
        .unwrap()
        .expect("request accepted");

    for world in [&mut client, &mut follower] {
        let mut queue = ReceiveQueue::new();
        queue.insert(packet.clone()).unwrap();
        queue.run_pending(world).unwrap();
        assert_eq!(state_digest(world), state_digest(&host_world));
    }
}

#[test]
fn tampered_stream_is_detected() {
    let mut host_world = world();
    let mut client = host_world.clone();
    let mut relay = CommandRelay::new();
    let mut host = SessionHost::new();

    relay
        .issue(
            &mut client,
            PLAYER,
            &GameCommandArg::CreateTree(TreePlacementArgs {
                pos: TilePos::new(20, 20),
                object: 0,
            }),
            CommandFlags::APPLY,
        )
        .unwrap();
    let mut packet = host
        .sequence(&mut host_world, relay.take_outgoing().remove(0))
        .unwrap()
        .expect("request accepted");
    // A different argument no longer matches the carried digest.
    packet.blocks = GameCommandArg::CreateTree(TreePlacementArgs {
        pos: TilePos::new(21, 20),
        object: 0,
    })
    .encode();

    let mut queue = ReceiveQueue::new();
    queue.insert(packet).unwrap();
    assert!(matches!(
        queue.run_pending(&mut client),
        Err(SessionError::Divergence { index: 0, .. })
    ));
}
