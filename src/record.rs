//! Consumed records.

use std::fmt;

use rdkafka::message::Message;

/// An owned copy of a consumed message.
///
/// Keys and values are decoded as UTF-8, replacing invalid sequences.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub key: Option<String>,
    pub value: Option<String>,
}

impl Record {
    /// Copies the relevant parts of a message received from the broker.
    pub fn from_message<M: Message>(message: &M) -> Record {
        Record {
            topic: message.topic().to_string(),
            partition: message.partition(),
            offset: message.offset(),
            key: message.key().map(decode),
            value: message.payload().map(decode),
        }
    }
}

fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

struct OrNull<'a>(&'a Option<String>);

impl fmt::Display for OrNull<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            Some(s) => f.write_str(s),
            None => f.write_str("null"),
        }
    }
}

/// The console line printed by the consumer.
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Key:{} Value: {} Partition: {} Offset: {}",
            OrNull(&self.key),
            OrNull(&self.value),
            self.partition,
            self.offset
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rdkafka::message::{OwnedMessage, Timestamp};

    #[test]
    fn test_console_line() {
        let record = Record {
            topic: "mt-topic".into(),
            partition: 2,
            offset: 41,
            key: Some("id-7".into()),
            value: Some("hello world".into()),
        };
        assert_eq!(
            record.to_string(),
            "Key:id-7 Value: hello world Partition: 2 Offset: 41"
        );
    }

    #[test]
    fn test_missing_key_prints_null() {
        let record = Record {
            topic: "mt-topic".into(),
            partition: 0,
            offset: 0,
            key: None,
            value: Some("hello world".into()),
        };
        assert_eq!(
            record.to_string(),
            "Key:null Value: hello world Partition: 0 Offset: 0"
        );
    }

    #[test]
    fn test_from_message() {
        let message = OwnedMessage::new(
            Some(b"hello world".to_vec()),
            None,
            "mt-topic".to_string(),
            Timestamp::NotAvailable,
            3,
            12,
            None,
        );
        let record = Record::from_message(&message);
        assert_eq!(record.topic, "mt-topic");
        assert_eq!(record.partition, 3);
        assert_eq!(record.offset, 12);
        assert_eq!(record.key, None);
        assert_eq!(record.value.as_deref(), Some("hello world"));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let message = OwnedMessage::new(
            Some(vec![0x66, 0x6f, 0xff]),
            Some(b"k".to_vec()),
            "mt-topic".to_string(),
            Timestamp::NotAvailable,
            0,
            1,
            None,
        );
        let record = Record::from_message(&message);
        assert_eq!(record.key.as_deref(), Some("k"));
        assert_eq!(record.value.as_deref(), Some("fo\u{fffd}"));
    }
}
