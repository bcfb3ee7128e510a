// ── VICI wire codec ──
//
// Packet layout: u32 big-endian length, u8 packet type, for named types a
// u8-length name, then an encoded message. Message elements are a u8 type
// tag followed by a type-specific body.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::Error;
use crate::message::{Element, Message};

/// Largest packet the daemon accepts (payload, excluding the length prefix).
pub const MAX_PACKET_SIZE: usize = 512 * 1024;

const SECTION_START: u8 = 1;
const SECTION_END: u8 = 2;
const KEY_VALUE: u8 = 3;
const LIST_START: u8 = 4;
const LIST_ITEM: u8 = 5;
const LIST_END: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketType {
    CmdRequest = 0,
    CmdResponse = 1,
    CmdUnknown = 2,
    EventRegister = 3,
    EventUnregister = 4,
    EventConfirm = 5,
    EventUnknown = 6,
    Event = 7,
}

impl PacketType {
    /// Whether packets of this type carry a name after the type byte.
    pub fn is_named(self) -> bool {
        matches!(
            self,
            Self::CmdRequest | Self::EventRegister | Self::EventUnregister | Self::Event
        )
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::CmdRequest,
            1 => Self::CmdResponse,
            2 => Self::CmdUnknown,
            3 => Self::EventRegister,
            4 => Self::EventUnregister,
            5 => Self::EventConfirm,
            6 => Self::EventUnknown,
            7 => Self::Event,
            _ => return None,
        })
    }
}

/// One framed VICI packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub kind: PacketType,
    pub name: Option<String>,
    pub message: Message,
}

impl Packet {
    pub fn new(kind: PacketType, name: Option<&str>, message: Message) -> Self {
        Self {
            kind,
            name: name.map(str::to_owned),
            message,
        }
    }

    /// Encode the packet including its length prefix.
    pub fn encode(&self) -> Result<Bytes, Error> {
        let mut payload = BytesMut::new();
        payload.put_u8(self.kind as u8);

        if self.kind.is_named() {
            let name = self.name.as_deref().ok_or_else(|| {
                Error::Encode(format!("{:?} packet requires a name", self.kind))
            })?;
            put_name(&mut payload, name)?;
        }

        encode_message_into(&mut payload, &self.message)?;

        if payload.len() > MAX_PACKET_SIZE {
            return Err(Error::PacketTooLarge {
                size: payload.len(),
                max: MAX_PACKET_SIZE,
            });
        }

        let mut framed = BytesMut::with_capacity(payload.len() + 4);
        #[allow(clippy::cast_possible_truncation)]
        framed.put_u32(payload.len() as u32);
        framed.extend_from_slice(&payload);
        Ok(framed.freeze())
    }

    /// Decode a packet payload (the bytes after the length prefix).
    pub fn decode(mut payload: Bytes) -> Result<Self, Error> {
        if !payload.has_remaining() {
            return Err(Error::Protocol("empty packet".into()));
        }
        let raw = payload.get_u8();
        let kind = PacketType::from_u8(raw)
            .ok_or_else(|| Error::Protocol(format!("unknown packet type {raw}")))?;

        let name = if kind.is_named() {
            Some(take_name(&mut payload)?)
        } else {
            None
        };

        let message = decode_message(payload)?;
        Ok(Self {
            kind,
            name,
            message,
        })
    }
}

// ── Message encoding ────────────────────────────────────────────────

pub fn encode_message(message: &Message) -> Result<Bytes, Error> {
    let mut buf = BytesMut::new();
    encode_message_into(&mut buf, message)?;
    Ok(buf.freeze())
}

fn encode_message_into(buf: &mut BytesMut, message: &Message) -> Result<(), Error> {
    for (key, element) in message.iter() {
        match element {
            Element::Scalar(value) => {
                buf.put_u8(KEY_VALUE);
                put_name(buf, key)?;
                put_value(buf, value)?;
            }
            Element::List(items) => {
                buf.put_u8(LIST_START);
                put_name(buf, key)?;
                for item in items {
                    buf.put_u8(LIST_ITEM);
                    put_value(buf, item)?;
                }
                buf.put_u8(LIST_END);
            }
            Element::Section(section) => {
                buf.put_u8(SECTION_START);
                put_name(buf, key)?;
                encode_message_into(buf, section)?;
                buf.put_u8(SECTION_END);
            }
        }
    }
    Ok(())
}

fn put_name(buf: &mut BytesMut, name: &str) -> Result<(), Error> {
    let len = u8::try_from(name.len())
        .map_err(|_| Error::Encode(format!("name '{name}' longer than 255 bytes")))?;
    buf.put_u8(len);
    buf.extend_from_slice(name.as_bytes());
    Ok(())
}

fn put_value(buf: &mut BytesMut, value: &[u8]) -> Result<(), Error> {
    let len = u16::try_from(value.len())
        .map_err(|_| Error::Encode(format!("value of {} bytes too long", value.len())))?;
    buf.put_u16(len);
    buf.extend_from_slice(value);
    Ok(())
}

// ── Message decoding ────────────────────────────────────────────────

/// Decode a message body. Sections are tracked on an explicit stack so that
/// deeply nested input cannot exhaust the call stack.
pub fn decode_message(mut buf: Bytes) -> Result<Message, Error> {
    // (section name, partially-built section); the root has no name
    let mut stack: Vec<(Option<String>, Message)> = vec![(None, Message::new())];

    while buf.has_remaining() {
        let tag = buf.get_u8();
        match tag {
            SECTION_START => {
                let name = take_name(&mut buf)?;
                stack.push((Some(name), Message::new()));
            }
            SECTION_END => {
                if stack.len() < 2 {
                    return Err(Error::Protocol("unexpected section end".into()));
                }
                if let Some((Some(name), section)) = stack.pop() {
                    current(&mut stack)?.set(name, section);
                }
            }
            KEY_VALUE => {
                let key = take_name(&mut buf)?;
                let value = take_value(&mut buf)?;
                current(&mut stack)?.set(key, value);
            }
            LIST_START => {
                let key = take_name(&mut buf)?;
                let items = take_list(&mut buf)?;
                current(&mut stack)?.set(key, Element::List(items));
            }
            other => {
                return Err(Error::Protocol(format!("unexpected element type {other}")));
            }
        }
    }

    if stack.len() != 1 {
        return Err(Error::Protocol("unterminated section".into()));
    }
    stack
        .pop()
        .map(|(_, root)| root)
        .ok_or_else(|| Error::Protocol("empty decode stack".into()))
}

fn current(stack: &mut [(Option<String>, Message)]) -> Result<&mut Message, Error> {
    stack
        .last_mut()
        .map(|(_, message)| message)
        .ok_or_else(|| Error::Protocol("empty decode stack".into()))
}

fn take_list(buf: &mut Bytes) -> Result<Vec<Bytes>, Error> {
    let mut items = Vec::new();
    loop {
        if !buf.has_remaining() {
            return Err(Error::Protocol("unterminated list".into()));
        }
        match buf.get_u8() {
            LIST_ITEM => items.push(take_value(buf)?),
            LIST_END => return Ok(items),
            other => {
                return Err(Error::Protocol(format!("unexpected element {other} in list")));
            }
        }
    }
}

fn take_name(buf: &mut Bytes) -> Result<String, Error> {
    if !buf.has_remaining() {
        return Err(Error::Protocol("truncated name length".into()));
    }
    let len = usize::from(buf.get_u8());
    if buf.remaining() < len {
        return Err(Error::Protocol("truncated name".into()));
    }
    let raw = buf.split_to(len);
    String::from_utf8(raw.to_vec()).map_err(|_| Error::Protocol("name is not UTF-8".into()))
}

fn take_value(buf: &mut Bytes) -> Result<Bytes, Error> {
    if buf.remaining() < 2 {
        return Err(Error::Protocol("truncated value length".into()));
    }
    let len = usize::from(buf.get_u16());
    if buf.remaining() < len {
        return Err(Error::Protocol("truncated value".into()));
    }
    Ok(buf.split_to(len))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn encodes_key_value_bytes() {
        let msg = Message::new().with("type", "X509");
        let encoded = encode_message(&msg).unwrap();
        assert_eq!(
            encoded.as_ref(),
            &[KEY_VALUE, 4, b't', b'y', b'p', b'e', 0, 4, b'X', b'5', b'0', b'9']
        );
    }

    #[test]
    fn packet_has_length_prefix_and_name() {
        let packet = Packet::new(PacketType::EventRegister, Some("list-sa"), Message::new());
        let encoded = packet.encode().unwrap();
        // length(4) + type(1) + name len(1) + "list-sa"(7)
        assert_eq!(encoded.len(), 13);
        assert_eq!(&encoded[..4], &[0, 0, 0, 9]);
        assert_eq!(encoded[4], PacketType::EventRegister as u8);
        assert_eq!(&encoded[6..], b"list-sa");
    }

    #[test]
    fn unnamed_packet_decodes_without_name() {
        let payload = Bytes::from_static(&[PacketType::EventConfirm as u8]);
        let packet = Packet::decode(payload).unwrap();
        assert_eq!(packet.kind, PacketType::EventConfirm);
        assert_eq!(packet.name, None);
        assert!(packet.message.is_empty());
    }

    #[test]
    fn nested_sections_keep_order() {
        let msg = Message::new()
            .with("b", "2")
            .with(
                "outer",
                Message::new()
                    .with("z", vec!["1", "2"])
                    .with("inner", Message::new().with("k", "v")),
            )
            .with("a", "1");
        let decoded = decode_message(encode_message(&msg).unwrap()).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(decoded.keys().collect::<Vec<_>>(), vec!["b", "outer", "a"]);
    }

    #[test]
    fn rejects_stray_section_end() {
        let err = decode_message(Bytes::from_static(&[SECTION_END])).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn rejects_unterminated_section() {
        let err = decode_message(Bytes::from_static(&[SECTION_START, 1, b's'])).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn rejects_truncated_value() {
        let err = decode_message(Bytes::from_static(&[KEY_VALUE, 1, b'k', 0, 5, b'a'])).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn rejects_overlong_key() {
        let key = "k".repeat(256);
        let err = encode_message(&Message::new().with(key, "v")).unwrap_err();
        assert!(matches!(err, Error::Encode(_)));
    }

    #[test]
    fn rejects_unknown_packet_type() {
        let err = Packet::decode(Bytes::from_static(&[42])).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }
}
