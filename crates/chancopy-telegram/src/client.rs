use std::{
    collections::HashMap,
    io::{self, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use grammers_client::{
    types::{Attribute, Chat, Downloadable, Media, Message},
    Client, Config as ClientConfig, InitParams, InputMessage, SignInError,
};
use grammers_session::Session;
use tokio::sync::Mutex;
use tracing::info;

use chancopy_core::{
    config::Config,
    domain::{ChannelHandle, CopyRange, MediaKind, Post, PostId, VideoMeta},
    errors::Error,
    ports::ChannelPort,
    Result,
};

/// Server-side cap on messages fetched per request.
const FETCH_CHUNK: usize = 100;

/// MTProto user-session adapter for `ChannelPort`.
///
/// Resolved chats and fetched messages are cached so downloads can reuse the
/// message objects without refetching.
pub struct ChannelClient {
    client: Client,
    session_file: PathBuf,
    chats: Mutex<HashMap<String, Chat>>,
    messages: Mutex<HashMap<(String, i32), Message>>,
}

impl ChannelClient {
    /// Connect and make sure the session is authorized, running the
    /// interactive login (code prompt, optional 2FA password) if it is not.
    pub async fn connect(cfg: &Config) -> Result<Self> {
        let session = Session::load_file_or_create(&cfg.session_file)
            .map_err(|e| Error::Telegram(format!("cannot open session file: {e}")))?;

        info!("connecting to Telegram");
        let client = Client::connect(ClientConfig {
            session,
            api_id: cfg.api_id,
            api_hash: cfg.api_hash.clone(),
            params: InitParams::default(),
        })
        .await
        .map_err(|e| Error::Telegram(format!("connect failed: {e}")))?;

        let authorized = client
            .is_authorized()
            .await
            .map_err(|e| Error::Telegram(format!("authorization check failed: {e}")))?;

        if authorized {
            info!("already authorized");
        } else {
            info!("not authorized, logging in");
            sign_in(&client, cfg).await?;
            info!("successfully logged in");
        }

        let this = Self {
            client,
            session_file: cfg.session_file.clone(),
            chats: Mutex::new(HashMap::new()),
            messages: Mutex::new(HashMap::new()),
        };
        this.save_session()?;
        Ok(this)
    }

    /// Persist the session so the next run skips the login prompts.
    pub fn save_session(&self) -> Result<()> {
        self.client
            .session()
            .save_to_file(&self.session_file)
            .map_err(|e| Error::Telegram(format!("cannot save session file: {e}")))
    }

    async fn chat(&self, handle: &ChannelHandle) -> Result<Chat> {
        self.chats
            .lock()
            .await
            .get(handle.as_str())
            .cloned()
            .ok_or_else(|| Error::Telegram(format!("channel not resolved: {handle}")))
    }
}

async fn sign_in(client: &Client, cfg: &Config) -> Result<()> {
    let token = client
        .request_login_code(&cfg.phone_number)
        .await
        .map_err(|e| Error::Telegram(format!("could not request login code: {e}")))?;

    let code = prompt("Enter the login code: ")?;
    match client.sign_in(&token, code.trim()).await {
        Ok(_) => Ok(()),
        Err(SignInError::PasswordRequired(password_token)) => {
            let hint = password_token
                .hint()
                .map(|h| h.to_string())
                .unwrap_or_else(|| "none".to_string());
            let password = prompt(&format!("Enter your 2FA password (hint: {hint}): "))?;
            client
                .check_password(password_token, password.trim())
                .await
                .map_err(|e| Error::Telegram(format!("password check failed: {e}")))?;
            Ok(())
        }
        Err(e) => Err(Error::Telegram(format!("sign in failed: {e}"))),
    }
}

#[async_trait]
impl ChannelPort for ChannelClient {
    async fn resolve(&self, handle: &ChannelHandle) -> Result<()> {
        if self.chats.lock().await.contains_key(handle.as_str()) {
            return Ok(());
        }

        let chat = self
            .client
            .resolve_username(handle.as_str())
            .await
            .map_err(|e| Error::Telegram(format!("cannot resolve {handle}: {e}")))?
            .ok_or_else(|| Error::Telegram(format!("channel not found: {handle}")))?;

        self.chats
            .lock()
            .await
            .insert(handle.as_str().to_string(), chat);
        Ok(())
    }

    async fn fetch_posts(&self, channel: &ChannelHandle, range: CopyRange) -> Result<Vec<Post>> {
        let chat = self.chat(channel).await?;
        let ids: Vec<i32> = range.ids().map(|p| p.0).collect();

        let mut posts = Vec::new();
        let mut cache = self.messages.lock().await;
        for chunk in ids.chunks(FETCH_CHUNK) {
            let fetched = self
                .client
                .get_messages_by_id(&chat, chunk)
                .await
                .map_err(|e| Error::Telegram(format!("cannot fetch posts from {channel}: {e}")))?;

            for message in fetched.into_iter().flatten() {
                posts.push(map_post(&message));
                cache.insert((channel.as_str().to_string(), message.id()), message);
            }
        }

        posts.sort_by_key(|p| p.id);
        Ok(posts)
    }

    async fn send_text(&self, channel: &ChannelHandle, text: &str) -> Result<()> {
        let chat = self.chat(channel).await?;
        self.client
            .send_message(&chat, text)
            .await
            .map_err(|e| Error::Telegram(format!("cannot send text to {channel}: {e}")))?;
        Ok(())
    }

    async fn download_media(
        &self,
        channel: &ChannelHandle,
        post: PostId,
        dir: &Path,
    ) -> Result<Option<PathBuf>> {
        let message = self
            .messages
            .lock()
            .await
            .get(&(channel.as_str().to_string(), post.0))
            .cloned()
            .ok_or_else(|| Error::Telegram(format!("post {post} was not fetched")))?;

        let Some(media) = message.media() else {
            return Ok(None);
        };

        let path = dir.join(download_file_name(post, &media));
        self.client
            .download_media(&Downloadable::Media(media), &path)
            .await
            .map_err(|e| Error::Telegram(format!("download failed for post {post}: {e}")))?;
        Ok(Some(path))
    }

    async fn send_photo(&self, channel: &ChannelHandle, path: &Path, caption: &str) -> Result<()> {
        let chat = self.chat(channel).await?;
        let uploaded = self
            .client
            .upload_file(path)
            .await
            .map_err(|e| Error::Telegram(format!("upload failed: {e}")))?;

        self.client
            .send_message(&chat, InputMessage::text(caption).photo(uploaded))
            .await
            .map_err(|e| Error::Telegram(format!("cannot send photo to {channel}: {e}")))?;
        Ok(())
    }

    async fn send_video(
        &self,
        channel: &ChannelHandle,
        path: &Path,
        caption: &str,
        meta: VideoMeta,
    ) -> Result<()> {
        let chat = self.chat(channel).await?;
        let uploaded = self
            .client
            .upload_file(path)
            .await
            .map_err(|e| Error::Telegram(format!("upload failed: {e}")))?;

        let message = InputMessage::text(caption)
            .document(uploaded)
            .mime_type("video/mp4")
            .attribute(Attribute::Video {
                round_message: false,
                supports_streaming: true,
                duration: Duration::from_secs_f64(meta.duration_secs),
                w: meta.width,
                h: meta.height,
            });

        self.client
            .send_message(&chat, message)
            .await
            .map_err(|e| Error::Telegram(format!("cannot send video to {channel}: {e}")))?;
        Ok(())
    }
}

fn map_post(message: &Message) -> Post {
    let text = Some(message.text().to_string()).filter(|t| !t.is_empty());
    let media = message.media().map(|m| match m {
        Media::Photo(_) => MediaKind::Photo,
        Media::Document(doc) => {
            if doc
                .mime_type()
                .is_some_and(|mime| mime.starts_with("video/"))
            {
                MediaKind::Video
            } else {
                MediaKind::Document {
                    file_name: Some(doc.name().to_string()).filter(|n| !n.is_empty()),
                }
            }
        }
        _ => MediaKind::Other,
    });

    Post {
        id: PostId(message.id()),
        text,
        media,
    }
}

/// Local file name for a download, prefixed with the post id so two posts
/// carrying the same attachment name cannot collide.
fn download_file_name(post: PostId, media: &Media) -> String {
    match media {
        Media::Photo(_) => format!("post_{post}.jpg"),
        Media::Document(doc) => {
            let name = doc.name();
            if name.is_empty() {
                format!("post_{post}.mp4")
            } else {
                format!("{post}_{name}")
            }
        }
        _ => format!("post_{post}.bin"),
    }
}

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line)
}
