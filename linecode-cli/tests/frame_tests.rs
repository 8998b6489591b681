use linecode_cli::{commands::frame, FrameMode};
use linecode_core::{types::to_bit_string, InputKind};

#[test]
fn frame_bit_mode_restores_input() {
    let (framed, restored) = frame::execute("01111110111110", InputKind::Auto, FrameMode::Bit).unwrap();

    assert_eq!(to_bit_string(&framed.stuffed), "0111110101111100");
    assert_eq!(framed.inserted_positions, vec![6, 14]);
    assert_eq!(restored.error, None);
    assert_eq!(to_bit_string(&restored.bits), "01111110111110");
}

#[test]
fn frame_byte_mode_escapes_text() {
    // '~' is the flag byte
    let (framed, restored) = frame::execute("a~", InputKind::Auto, FrameMode::Byte).unwrap();

    assert_eq!(framed.stuffed.len(), 40);
    assert_eq!(framed.inserted_positions, vec![16]);
    assert_eq!(restored.escapes_removed, 1);
    assert_eq!(restored.flags_removed, 2);
    assert_eq!(to_bit_string(&restored.bits), "0110000101111110");
}

#[test]
fn frame_byte_mode_truncates_partial_byte() {
    let (framed, restored) = frame::execute("0100000110", InputKind::Auto, FrameMode::Byte).unwrap();

    assert_eq!(framed.truncated_bits, 2);
    assert_eq!(framed.payload_len(), 8);
    assert_eq!(to_bit_string(&restored.bits), "01000001");
    assert_eq!(restored.error, None);
}

#[test]
fn frame_rejects_empty_input() {
    assert!(frame::execute("  \n", InputKind::Auto, FrameMode::Bit).is_err());
}
