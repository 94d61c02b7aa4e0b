//! Property tests for the frame codec and receiver

use ksplink_protocol::{
    checksum, ControlPacket, Frame, FrameError, FrameReceiver, HandshakePacket, Packet,
    CONTROL_LEN, FRAME_MAGIC,
};
use proptest::prelude::*;

fn control_strategy() -> impl Strategy<Value = ControlPacket> {
    (
        any::<u8>(),
        any::<u8>(),
        any::<u16>(),
        any::<u8>(),
        prop::array::uniform9(-1000i16..=1000),
    )
        .prop_map(|(main_controls, mode, control_group, navball_sas_mode, axes)| {
            ControlPacket {
                main_controls,
                mode,
                control_group,
                navball_sas_mode,
                additional_control_byte: 0,
                pitch: axes[0],
                roll: axes[1],
                yaw: axes[2],
                tx: axes[3],
                ty: axes[4],
                tz: axes[5],
                wheel_steer: axes[6],
                throttle: axes[7],
                wheel_throttle: axes[8],
            }
        })
}

fn receive_all(bytes: &[u8]) -> (Vec<Frame>, Vec<FrameError>) {
    let mut receiver = FrameReceiver::new();
    let mut frames = Vec::new();
    let mut errors = Vec::new();
    for outcome in receiver.feed_slice(bytes) {
        match outcome {
            Ok(frame) => frames.push(frame),
            Err(e) => errors.push(e),
        }
    }
    (frames, errors)
}

proptest! {
    #[test]
    fn control_frame_roundtrip(packet in control_strategy()) {
        let encoded = packet.to_frame().unwrap().encode_to_vec().unwrap();
        let (frames, errors) = receive_all(&encoded);

        prop_assert!(errors.is_empty());
        prop_assert_eq!(frames.len(), 1);
        prop_assert_eq!(Packet::from_frame(&frames[0]).unwrap(), Packet::Control(packet));
    }

    #[test]
    fn handshake_frame_roundtrip(markers in any::<[u8; 3]>()) {
        let packet = HandshakePacket { markers };
        let encoded = packet.to_frame().unwrap().encode_to_vec().unwrap();
        let (frames, _) = receive_all(&encoded);

        prop_assert_eq!(frames.len(), 1);
        prop_assert_eq!(Packet::from_frame(&frames[0]).unwrap(), Packet::Handshake(packet));
    }

    #[test]
    fn resync_after_garbage(
        garbage in prop::collection::vec(any::<u8>().prop_filter("no magic", |b| *b != FRAME_MAGIC[0]), 0..64),
        packet in control_strategy(),
    ) {
        let mut stream = garbage.clone();
        stream.extend_from_slice(&packet.to_frame().unwrap().encode_to_vec().unwrap());

        let (frames, errors) = receive_all(&stream);
        prop_assert!(errors.is_empty());
        prop_assert_eq!(frames.len(), 1);
    }

    #[test]
    fn single_bit_flip_fails_checksum(
        packet in control_strategy(),
        byte in 4usize..4 + CONTROL_LEN,
        bit in 0u8..8,
    ) {
        // Body bytes and the checksum itself; the id byte would change which size applies
        let mut encoded = packet.to_frame().unwrap().encode_to_vec().unwrap().to_vec();
        prop_assert_eq!(encoded.len(), CONTROL_LEN + 4);
        encoded[byte] ^= 1 << bit;

        let (frames, errors) = receive_all(&encoded);
        prop_assert!(frames.is_empty());
        let is_checksum_error = matches!(errors.as_slice(), [FrameError::InvalidChecksum { .. }]);
        prop_assert!(is_checksum_error);
    }

    #[test]
    fn flipped_length_is_rejected(packet in control_strategy(), bit in 0u8..8) {
        let mut encoded = packet.to_frame().unwrap().encode_to_vec().unwrap().to_vec();
        encoded[2] ^= 1 << bit;

        let (frames, errors) = receive_all(&encoded);
        prop_assert!(frames.is_empty());
        let is_size_error = matches!(errors.first(), Some(FrameError::SizeMismatch { .. }));
        prop_assert!(is_size_error);
    }

    #[test]
    fn checksum_matches_fold(length in any::<u8>(), payload in prop::collection::vec(any::<u8>(), 0..32)) {
        let expected = payload.iter().fold(length, |acc, b| acc ^ b);
        prop_assert_eq!(checksum(length, &payload), expected);
    }
}

#[test]
fn decode_is_idempotent() {
    let packet = ControlPacket {
        main_controls: 0b1010_1010,
        pitch: 500,
        ..Default::default()
    };
    let frame = packet.to_frame().unwrap();
    let first = Packet::from_frame(&frame).unwrap();
    let second = Packet::from_frame(&frame).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, Packet::Control(packet));
}

#[test]
fn device_control_frame_is_accepted() {
    // Built by hand the way the panel firmware lays it out
    let mut payload = [0u8; 25];
    payload[0] = 101;
    payload[1] = 0b1000_0001;
    payload[5] = 0x21;
    payload[23..25].copy_from_slice(&750i16.to_le_bytes());
    let mut stream = vec![0xBE, 0xEF, 25];
    stream.extend_from_slice(&payload);
    stream.push(payload.iter().fold(25u8, |acc, b| acc ^ b));

    let (frames, errors) = receive_all(&stream);
    assert!(errors.is_empty(), "{:?}", errors);
    assert_eq!(frames.len(), 1);

    let Packet::Control(control) = Packet::from_frame(&frames[0]).unwrap() else {
        panic!("not a control packet");
    };
    assert_eq!(control.main_controls, 0b1000_0001);
    assert_eq!(control.navball_sas_mode, 0x21);
    assert_eq!(control.wheel_throttle, 750);
}
