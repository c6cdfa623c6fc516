//! MIME 邮件组装

use crate::header::{Priority, XPriority};
use crate::types::{DecodedAttachment, EmailParty, MessagePriority, RecipientList};
use courier_errors::{MailError, MailResult};
use lettre::Message;
use lettre::message::{Attachment as MimeAttachment, MultiPart, SinglePart};

/// 组装一封 HTML 邮件
///
/// 没有附件时正文是单个 `text/html` 部分，有附件时为 `multipart/mixed`，正文在前
pub fn build_message(
    from: &EmailParty,
    to: &RecipientList,
    subject: &str,
    html_body: String,
    attachments: Vec<DecodedAttachment>,
    priority: MessagePriority,
) -> MailResult<Message> {
    if to.is_empty() {
        return Err(MailError::validation("Recipient list is empty"));
    }

    let mut builder = Message::builder()
        .from(from.to_mailbox()?)
        .subject(subject)
        .header(Priority(priority))
        .header(XPriority(priority));

    for recipient in to {
        builder = builder.to(recipient.to_mailbox()?);
    }

    let html = SinglePart::html(html_body);

    let message = if attachments.is_empty() {
        builder.singlepart(html)
    } else {
        let mut parts = MultiPart::mixed().singlepart(html);
        for attachment in attachments {
            parts = parts.singlepart(
                MimeAttachment::new(attachment.file_name)
                    .body(attachment.bytes, attachment.content_type),
            );
        }
        builder.multipart(parts)
    };

    message.map_err(|e| MailError::validation_with("Failed to build message", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Attachment, decode_attachments};

    fn formatted(message: &Message) -> String {
        String::from_utf8(message.formatted()).unwrap()
    }

    fn header<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
        let prefix = format!("{}: ", name);
        raw.lines()
            .take_while(|line| !line.is_empty())
            .find_map(|line| line.strip_prefix(prefix.as_str()))
    }

    #[test]
    fn test_single_part_html() {
        let message = build_message(
            &EmailParty::new("Alice", "alice@x.com"),
            &EmailParty::new("Bob", "bob@y.com").into(),
            "Hi",
            "<p>hello</p>".to_string(),
            Vec::new(),
            MessagePriority::Normal,
        )
        .unwrap();

        let raw = formatted(&message);
        assert_eq!(header(&raw, "From"), Some("Alice <alice@x.com>"));
        assert_eq!(header(&raw, "To"), Some("Bob <bob@y.com>"));
        assert_eq!(header(&raw, "Subject"), Some("Hi"));
        assert_eq!(header(&raw, "Priority"), Some("normal"));
        assert_eq!(header(&raw, "X-Priority"), Some("3 (Normal)"));
        assert!(header(&raw, "Content-Type").unwrap().starts_with("text/html"));
        assert!(raw.contains("<p>hello</p>"));
    }

    #[test]
    fn test_to_header_keeps_order() {
        let to: RecipientList = vec![
            EmailParty::new("Bob", "bob@y.com"),
            EmailParty::new("Carol", "carol@z.com"),
        ]
        .into();

        let message = build_message(
            &EmailParty::new("Alice", "alice@x.com"),
            &to,
            "Hi",
            "<p>hello</p>".to_string(),
            Vec::new(),
            MessagePriority::High,
        )
        .unwrap();

        let raw = formatted(&message);
        assert_eq!(
            header(&raw, "To"),
            Some("Bob <bob@y.com>, Carol <carol@z.com>")
        );
        assert_eq!(header(&raw, "Priority"), Some("urgent"));

        let envelope: Vec<String> = message
            .envelope()
            .to()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(envelope, vec!["bob@y.com", "carol@z.com"]);
    }

    #[test]
    fn test_attachments_become_mixed_parts() {
        let attachments =
            decode_attachments(&[Attachment::from_bytes("a.txt", b"hi")]).unwrap();

        let message = build_message(
            &EmailParty::new("Alice", "alice@x.com"),
            &EmailParty::new("Bob", "bob@y.com").into(),
            "Hi",
            "<p>hello</p>".to_string(),
            attachments,
            MessagePriority::Normal,
        )
        .unwrap();

        let raw = formatted(&message);
        assert!(header(&raw, "Content-Type").unwrap().starts_with("multipart/mixed"));
        assert!(raw.contains("Content-Disposition: attachment; filename=\"a.txt\""));
        assert!(raw.contains("text/html"));
        assert!(raw.contains("text/plain"));
    }

    #[test]
    fn test_empty_recipients_rejected() {
        let err = build_message(
            &EmailParty::new("Alice", "alice@x.com"),
            &RecipientList::new(),
            "Hi",
            String::new(),
            Vec::new(),
            MessagePriority::Normal,
        )
        .unwrap_err();

        assert!(matches!(err, MailError::Validation { .. }));
    }
}
