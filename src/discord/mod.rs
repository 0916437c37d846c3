pub mod commands;
pub mod confirm;
pub mod permissions;

use crate::config::Config;
use crate::content::ContentClient;
use crate::error::{DiscordError, Result};
use crate::store::ClassStore;
use serenity::all::{
    Client, Context, CreateEmbed, CreateMessage, EventHandler, GatewayIntents, Member, Message,
    Ready,
};
use serenity::async_trait;
use tracing::{error, info};

/// Event handler holding everything the command handlers need.
pub struct Bot {
    pub(crate) config: Config,
    pub(crate) store: ClassStore,
    pub(crate) content: ContentClient,
}

impl Bot {
    pub fn new(config: Config, store: ClassStore, content: ContentClient) -> Self {
        Self {
            config,
            store,
            content,
        }
    }
}

#[async_trait]
impl EventHandler for Bot {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);
    }

    async fn message(&self, ctx: Context, msg: Message) {
        // Ignore the bot's own messages (and other bots)
        if msg.author.bot {
            return;
        }
        commands::dispatch(self, &ctx, &msg).await;
    }

    async fn guild_member_addition(&self, ctx: Context, member: Member) {
        if member.guild_id.get() != self.config.discord.guild_id {
            return;
        }
        info!(user = %member.user.name, "Welcoming new member");
        if let Err(e) = send_welcome(&ctx, &member, &self.config.discord.prefix).await {
            error!(user = %member.user.name, "Failed to send welcome message: {e:?}");
        }
    }
}

fn welcome_embed(prefix: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title("Welcome to the CS Discord! Here's some important info to get you started on the server.")
        .colour(0x38a4f4)
        .field(
            "📛",
            "First things first, we need to know who you are! Message one of the admins (the people in yellow on the right when you're in the server) and tell them who you are.",
            false,
        )
        .field(
            "🏷️",
            "Next you need to set your name! On a computer, right click yourself while in the server and select 'change nickname' to set your name for the server.",
            false,
        )
        .field(
            "📚",
            format!(
                "Lastly, you can join specific class chats. Type {prefix}classes to see available classes and {prefix}joinclass class-id to join one."
            ),
            false,
        )
        .field(
            "P.S.",
            "For all other rules ask an admin or see the server-rules channel.",
            false,
        )
}

async fn send_welcome(
    ctx: &Context,
    member: &Member,
    prefix: &str,
) -> std::result::Result<(), DiscordError> {
    member
        .user
        .dm(
            &ctx.http,
            CreateMessage::new().embed(welcome_embed(prefix)),
        )
        .await
        .map_err(|source| DiscordError::ApiFailed {
            context: "send welcome DM".to_string(),
            source,
        })?;
    Ok(())
}

/// Create the Discord client (without starting it).
pub async fn create_client(
    config: Config,
    store: ClassStore,
    content: ContentClient,
) -> Result<Client> {
    if config.discord.token.is_empty() {
        return Err(DiscordError::NoToken.into());
    }

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::MESSAGE_CONTENT;

    let token = config.discord.token.clone();
    let handler = Bot::new(config, store, content);
    let client = Client::builder(&token, intents)
        .event_handler(handler)
        .await
        .map_err(|source| DiscordError::ConnectionFailed { source })?;

    Ok(client)
}

/// Create and run the Discord bot until it disconnects.
pub async fn run_bot(config: Config, store: ClassStore, content: ContentClient) -> Result<()> {
    let mut client = create_client(config, store, content).await?;

    info!("Starting Discord bot...");
    client
        .start()
        .await
        .map_err(|source| DiscordError::ConnectionFailed { source })?;

    Ok(())
}
