#![no_main]

use libfuzzer_sys::fuzz_target;
use spellwire::protocol::message::{Message, Opcode};

fuzz_target!(|data: &[u8]| {
    // First byte picks the layout, the rest is the body.
    let Some((&selector, body)) = data.split_first() else {
        return;
    };
    let opcode = Opcode::ALL[usize::from(selector) % Opcode::ALL.len()];

    if let Ok(message) = Message::decode(opcode, body) {
        let reencoded = message.encode();
        assert!(Message::decode(opcode, &reencoded).is_ok());
    }
});
