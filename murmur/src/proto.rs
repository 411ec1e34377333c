pub mod chat {
    include!("./generated/chat.rs");

    use crate::Message;

    impl From<Message> for ChatMessage {
        fn from(message: Message) -> Self {
            Self {
                id: message.id,
                sender: message.sender,
                text: message.text,
                created_at: message.created_at,
            }
        }
    }

    impl From<ChatMessage> for Message {
        fn from(message: ChatMessage) -> Self {
            Self {
                id: message.id,
                sender: message.sender,
                text: message.text,
                created_at: message.created_at,
            }
        }
    }

    impl From<&Message> for SendMessageAck {
        fn from(message: &Message) -> Self {
            Self {
                id: message.id,
                created_at: message.created_at,
            }
        }
    }
}
