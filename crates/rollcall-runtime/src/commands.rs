//! Private-chat commands: `/start`, `/me`, and the `/load` dialog.
//!
//! `/load` walks an administrator through picking one of their tracked
//! conversations and uploading a `.txt` allow-list for it. Dialog state is
//! kept per user until the file is loaded or `/cancel` is sent.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use rollcall_core::{ConversationId, UserId};
use tracing::{debug, info, instrument, warn};

use crate::errors::Result;
use crate::registry::MembershipRegistry;
use crate::traits::{AllowListStore, ChatTransport};

/// Reply to `/start`.
pub const START_TEXT: &str = "You are now using this bot!";
/// Reply when the caller administers no tracked conversation.
pub const NOT_ADMIN_TEXT: &str = "You are not an admin in any chat that is being handled!";
/// Heading of the `/me` reply.
pub const ADMIN_LIST_INTRO: &str = "You are an admin in this channels:";
/// Heading of the `/load` prompt.
pub const LOAD_PROMPT: &str =
    "You are an admin in this channels. Please enter the name of the channel to load the data.";
/// Prompt for the allow-list file.
pub const ASK_FILE_TEXT: &str = "Now send me a file in txt format";
/// Reply to a label that matches none of the listed conversations.
pub const UNKNOWN_LABEL_TEXT: &str = "Unknown channel, please enter one of the names listed above.";
/// Reply when the uploaded file could not be fetched.
pub const DOWNLOAD_FAILED_TEXT: &str = "Could not read the file, please send it again.";
/// Reply to `/cancel`.
pub const CANCEL_TEXT: &str = "Bye!";

/// A document attached to an incoming message.
#[derive(Clone, Debug, Default)]
pub struct IncomingDocument {
    /// Transport file identifier.
    pub file_id: String,
    /// Original file name.
    pub file_name: Option<String>,
    /// MIME type.
    pub mime_type: Option<String>,
}

impl IncomingDocument {
    fn is_text(&self) -> bool {
        let by_name = self
            .file_name
            .as_deref()
            .is_some_and(|n| n.to_ascii_lowercase().ends_with(".txt"));
        let by_mime = self.mime_type.as_deref() == Some("text/plain");
        by_name || by_mime
    }
}

/// A message addressed to the agent.
#[derive(Clone, Debug)]
pub struct IncomingMessage {
    /// Sender.
    pub from: UserId,
    /// Whether it arrived in a private chat with the sender.
    pub private: bool,
    /// Text body.
    pub text: Option<String>,
    /// Attached document.
    pub document: Option<IncomingDocument>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Start,
    Me,
    Load,
    Cancel,
}

fn parse_command(text: &str) -> Option<Command> {
    let word = text.split_whitespace().next()?.strip_prefix('/')?;
    let name = word.split('@').next().unwrap_or(word);
    match name.to_ascii_lowercase().as_str() {
        "start" => Some(Command::Start),
        "me" => Some(Command::Me),
        "load" => Some(Command::Load),
        "cancel" => Some(Command::Cancel),
        _ => None,
    }
}

fn numbered(intro: &str, labels: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    let mut text = intro.to_string();
    for (i, label) in labels.into_iter().enumerate() {
        text.push_str(&format!("\n{}. {}", i + 1, label.as_ref()));
    }
    text
}

/// Split an uploaded allow-list into lines, dropping carriage returns.
#[must_use]
pub fn parse_allow_list(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .split('\n')
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}

#[derive(Clone, Debug)]
enum LoadDialog {
    AwaitingLabel {
        choices: BTreeMap<String, ConversationId>,
    },
    AwaitingFile {
        conversation: ConversationId,
        label: String,
    },
}

/// Handles command messages and the `/load` dialog.
pub struct CommandRouter {
    registry: Arc<MembershipRegistry>,
    transport: Arc<dyn ChatTransport>,
    allow_lists: Arc<dyn AllowListStore>,
    dialogs: Mutex<HashMap<UserId, LoadDialog>>,
}

impl CommandRouter {
    /// Create a router.
    pub fn new(
        registry: Arc<MembershipRegistry>,
        transport: Arc<dyn ChatTransport>,
        allow_lists: Arc<dyn AllowListStore>,
    ) -> Self {
        Self {
            registry,
            transport,
            allow_lists,
            dialogs: Mutex::new(HashMap::new()),
        }
    }

    /// Handle one message. Messages outside private chats are ignored.
    #[instrument(skip_all, fields(user_id = msg.from.get()))]
    pub async fn handle(&self, msg: IncomingMessage) -> Result<()> {
        if !msg.private {
            return Ok(());
        }

        if let Some(command) = msg.text.as_deref().and_then(parse_command) {
            return self.run_command(msg.from, command).await;
        }

        let dialog = self.dialogs.lock().get(&msg.from).cloned();
        match (dialog, msg.text, msg.document) {
            (Some(LoadDialog::AwaitingLabel { choices }), Some(text), _) => {
                self.choose_label(msg.from, choices, text.trim()).await
            }
            (Some(LoadDialog::AwaitingFile { conversation, label }), _, Some(doc)) => {
                self.receive_file(msg.from, conversation, label, doc).await
            }
            (Some(LoadDialog::AwaitingFile { .. }), Some(_), None) => {
                self.reply(msg.from, ASK_FILE_TEXT).await
            }
            _ => {
                debug!("message outside any dialog, ignoring");
                Ok(())
            }
        }
    }

    /// Tracked conversations where `user` is a human administrator, keyed by
    /// label (public username, else title).
    pub async fn admin_conversations(&self, user: UserId) -> BTreeMap<String, ConversationId> {
        let mut out = BTreeMap::new();
        for id in self.registry.tracked() {
            if !self.is_admin(id, user).await {
                continue;
            }
            let label = match self.transport.get_conversation(id).await {
                Ok(conversation) => conversation.label(),
                Err(e) => {
                    warn!(chat_id = id.get(), error = %e, "conversation lookup failed");
                    id.to_string()
                }
            };
            let _ = out.insert(label, id);
        }
        out
    }

    async fn is_admin(&self, id: ConversationId, user: UserId) -> bool {
        match self.transport.list_administrators(id).await {
            Ok(admins) => admins.iter().any(|a| !a.is_bot && a.user_id == user),
            Err(e) => {
                warn!(chat_id = id.get(), error = %e, "administrator lookup failed");
                false
            }
        }
    }

    async fn run_command(&self, from: UserId, command: Command) -> Result<()> {
        match command {
            Command::Start => self.reply(from, START_TEXT).await,
            Command::Me => {
                let chats = self.admin_conversations(from).await;
                if chats.is_empty() {
                    self.reply(from, NOT_ADMIN_TEXT).await
                } else {
                    self.reply(from, &numbered(ADMIN_LIST_INTRO, chats.keys())).await
                }
            }
            Command::Load => {
                let choices = self.admin_conversations(from).await;
                if choices.is_empty() {
                    let _ = self.dialogs.lock().remove(&from);
                    return self.reply(from, NOT_ADMIN_TEXT).await;
                }
                let prompt = numbered(LOAD_PROMPT, choices.keys());
                let _ = self
                    .dialogs
                    .lock()
                    .insert(from, LoadDialog::AwaitingLabel { choices });
                self.reply(from, &prompt).await
            }
            Command::Cancel => {
                let _ = self.dialogs.lock().remove(&from);
                self.reply(from, CANCEL_TEXT).await
            }
        }
    }

    async fn choose_label(
        &self,
        from: UserId,
        choices: BTreeMap<String, ConversationId>,
        label: &str,
    ) -> Result<()> {
        let Some(&conversation) = choices.get(label) else {
            return self.reply(from, UNKNOWN_LABEL_TEXT).await;
        };
        let _ = self.dialogs.lock().insert(
            from,
            LoadDialog::AwaitingFile {
                conversation,
                label: label.to_string(),
            },
        );
        self.reply(from, ASK_FILE_TEXT).await
    }

    async fn receive_file(
        &self,
        from: UserId,
        conversation: ConversationId,
        label: String,
        doc: IncomingDocument,
    ) -> Result<()> {
        if !doc.is_text() {
            return self.reply(from, ASK_FILE_TEXT).await;
        }
        if !self.is_admin(conversation, from).await {
            let _ = self.dialogs.lock().remove(&from);
            return self.reply(from, NOT_ADMIN_TEXT).await;
        }

        let bytes = match self.transport.download_document(&doc.file_id).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "allow-list download failed");
                return self.reply(from, DOWNLOAD_FAILED_TEXT).await;
            }
        };

        let names = parse_allow_list(&bytes);
        let report = self.allow_lists.load(conversation, names).await?;
        let _ = self.dialogs.lock().remove(&from);
        info!(
            chat_id = conversation.get(),
            inserted = report.inserted,
            skipped = report.skipped,
            "allow-list loaded"
        );
        self.reply(
            from,
            &format!("Loaded {} new usernames into {label}.", report.inserted),
        )
        .await
    }

    async fn reply(&self, to: UserId, text: &str) -> Result<()> {
        self.transport.send_direct_message(to, text).await?;
        Ok(())
    }
}
