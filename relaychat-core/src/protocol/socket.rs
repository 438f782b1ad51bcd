//! Socket.IO v5 packets, carried inside Engine.IO `Message` packets.
//!
//! Wire shape: `<type>[<namespace>,][<ack id>][<json>]`. The default
//! namespace `/` is implicit.

use serde_json::Value;

use super::ProtocolError;

pub const DEFAULT_NAMESPACE: &str = "/";

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
        data: Option<Value>,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        id: Option<u64>,
        data: Value,
    },
    Ack {
        namespace: String,
        id: u64,
        data: Value,
    },
    ConnectError {
        namespace: String,
        data: Value,
    },
}

impl SocketPacket {
    /// `["name", payload]` on the default namespace, no ack requested.
    pub fn event(name: &str, payload: Value) -> Self {
        SocketPacket::Event {
            namespace: DEFAULT_NAMESPACE.to_string(),
            id: None,
            data: Value::Array(vec![Value::String(name.to_string()), payload]),
        }
    }

    pub fn connect(namespace: &str) -> Self {
        SocketPacket::Connect {
            namespace: namespace.to_string(),
            data: None,
        }
    }

    pub fn disconnect(namespace: &str) -> Self {
        SocketPacket::Disconnect {
            namespace: namespace.to_string(),
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            SocketPacket::Connect { namespace, .. }
            | SocketPacket::Disconnect { namespace }
            | SocketPacket::Event { namespace, .. }
            | SocketPacket::Ack { namespace, .. }
            | SocketPacket::ConnectError { namespace, .. } => namespace,
        }
    }

    fn type_char(&self) -> char {
        match self {
            SocketPacket::Connect { .. } => '0',
            SocketPacket::Disconnect { .. } => '1',
            SocketPacket::Event { .. } => '2',
            SocketPacket::Ack { .. } => '3',
            SocketPacket::ConnectError { .. } => '4',
        }
    }

    pub fn encode(&self) -> String {
        let mut out = String::new();
        out.push(self.type_char());

        let namespace = self.namespace();
        if namespace != DEFAULT_NAMESPACE {
            out.push_str(namespace);
            out.push(',');
        }

        match self {
            SocketPacket::Connect { data, .. } => {
                if let Some(data) = data {
                    out.push_str(&data.to_string());
                }
            }
            SocketPacket::Disconnect { .. } => {}
            SocketPacket::Event { id, data, .. } => {
                if let Some(id) = id {
                    out.push_str(&id.to_string());
                }
                out.push_str(&data.to_string());
            }
            SocketPacket::Ack { id, data, .. } => {
                out.push_str(&id.to_string());
                out.push_str(&data.to_string());
            }
            SocketPacket::ConnectError { data, .. } => out.push_str(&data.to_string()),
        }

        out
    }

    pub fn decode(body: &str) -> Result<Self, ProtocolError> {
        let mut chars = body.chars();
        let kind = chars.next().ok_or(ProtocolError::EmptyFrame)?;
        if kind == '5' || kind == '6' {
            return Err(ProtocolError::BinaryUnsupported(body.to_string()));
        }

        let mut rest = chars.as_str();

        let namespace = if rest.starts_with('/') {
            match rest.find(',') {
                Some(comma) => {
                    let ns = &rest[..comma];
                    rest = &rest[comma + 1..];
                    ns.to_string()
                }
                None => {
                    let ns = rest.to_string();
                    rest = "";
                    ns
                }
            }
        } else {
            DEFAULT_NAMESPACE.to_string()
        };

        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        let id = if digits > 0 {
            let parsed = rest[..digits]
                .parse::<u64>()
                .map_err(|_| ProtocolError::Malformed(body.to_string()))?;
            rest = &rest[digits..];
            Some(parsed)
        } else {
            None
        };

        let data = if rest.is_empty() {
            None
        } else {
            Some(
                serde_json::from_str::<Value>(rest).map_err(|e| ProtocolError::InvalidJson {
                    frame: body.to_string(),
                    message: e.to_string(),
                })?,
            )
        };

        match kind {
            '0' => Ok(SocketPacket::Connect { namespace, data }),
            '1' => Ok(SocketPacket::Disconnect { namespace }),
            '2' => Ok(SocketPacket::Event {
                namespace,
                id,
                data: data.ok_or_else(|| ProtocolError::Malformed(body.to_string()))?,
            }),
            '3' => Ok(SocketPacket::Ack {
                namespace,
                id: id.ok_or_else(|| ProtocolError::Malformed(body.to_string()))?,
                data: data.unwrap_or(Value::Array(Vec::new())),
            }),
            '4' => Ok(SocketPacket::ConnectError {
                namespace,
                data: data.unwrap_or(Value::Null),
            }),
            other => Err(ProtocolError::UnknownPacketType {
                kind: other,
                frame: body.to_string(),
            }),
        }
    }

    /// Splits an `Event` into its name and first argument.
    ///
    /// Extra arguments are dropped; an event with no argument yields `null`.
    pub fn into_event(self) -> Result<(String, Value), ProtocolError> {
        let data = match self {
            SocketPacket::Event { data, .. } => data,
            other => return Err(ProtocolError::NotAnEvent(other.encode())),
        };

        let frame = data.to_string();
        let Value::Array(items) = data else {
            return Err(ProtocolError::Malformed(frame));
        };

        let mut items = items.into_iter();
        let name = match items.next() {
            Some(Value::String(name)) => name,
            _ => return Err(ProtocolError::Malformed(frame)),
        };

        Ok((name, items.next().unwrap_or(Value::Null)))
    }

    /// Session id the server assigned in a `Connect` reply, if any.
    pub fn session_id(&self) -> Option<&str> {
        match self {
            SocketPacket::Connect {
                data: Some(data), ..
            } => data.get("sid").and_then(Value::as_str),
            _ => None,
        }
    }

    /// Human readable reason of a `ConnectError`.
    ///
    /// v5 servers send `{"message": ...}`, older ones a bare string.
    pub fn error_message(&self) -> Option<String> {
        match self {
            SocketPacket::ConnectError { data, .. } => Some(match data {
                Value::String(message) => message.clone(),
                Value::Object(map) => map
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| data.to_string()),
                Value::Null => "connection refused".to_string(),
                other => other.to_string(),
            }),
            _ => None,
        }
    }
}
